//! End-to-end helpers operating on `image` buffers and files.

use std::path::Path;

use crate::core::{
    self, CropRegion, DebugSink, DetectError, ExposureBoundsDetector, ExposureBoundsParams,
    ExposureBoundsResult, NoopSink,
};
use crate::debug::PngDebugSink;
use crate::error::CropError;
use crate::io::{load_color, save_crop};
use crate::ops::ImageprocOps;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> core::GrayImageView<'_> {
    core::GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Run the full sweep on `img` with the `imageproc` backend.
pub fn detect_exposure_bounds(
    img: &::image::GrayImage,
    params: &ExposureBoundsParams,
) -> Result<ExposureBoundsResult, DetectError> {
    detect_exposure_bounds_with_sink(img, params, &mut NoopSink)
}

/// Like [`detect_exposure_bounds`], reporting intermediate products to `sink`
/// when `params.debug` is set.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, params, sink),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_exposure_bounds_with_sink(
    img: &::image::GrayImage,
    params: &ExposureBoundsParams,
    sink: &mut dyn DebugSink,
) -> Result<ExposureBoundsResult, DetectError> {
    let detector = ExposureBoundsDetector::new(params.clone())?;
    detector.detect_with_sink(&ImageprocOps, &gray_view(img), sink)
}

/// Final crop region of `img`.
pub fn compute_crop_region(
    img: &::image::GrayImage,
    params: &ExposureBoundsParams,
) -> Result<CropRegion, DetectError> {
    core::compute_crop_region(&gray_view(img), &ImageprocOps, params)
}

/// Run the detector on a raw row-major luminance buffer.
pub fn detect_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: &ExposureBoundsParams,
) -> Result<ExposureBoundsResult, DetectError> {
    let view = core::GrayImageView {
        width: width as usize,
        height: height as usize,
        data: pixels,
    };
    ExposureBoundsDetector::new(params.clone())?.detect(&ImageprocOps, &view)
}

/// Detect the exposed frame of `input` and write the crop to `output`.
///
/// With `params.debug` set and a `debug_dir`, intermediate masks and every
/// sweep level are written there as PNG files.
pub fn crop_file(
    input: &Path,
    output: &Path,
    params: &ExposureBoundsParams,
    debug_dir: Option<&Path>,
) -> Result<CropRegion, CropError> {
    let color = load_color(input)?;
    let gray = color.to_luma8();
    log::info!(
        "loaded {} ({}x{})",
        input.display(),
        gray.width(),
        gray.height()
    );

    let mut sink: Box<dyn DebugSink> = match debug_dir.filter(|_| params.debug) {
        Some(dir) => match PngDebugSink::new(dir) {
            Ok(sink) => Box::new(sink),
            Err(err) => {
                log::warn!(
                    "debug output disabled, cannot create {}: {err}",
                    dir.display()
                );
                Box::new(NoopSink)
            }
        },
        None => Box::new(NoopSink),
    };

    let result = detect_exposure_bounds_with_sink(&gray, params, sink.as_mut())?;
    let rect = result.region.crop_rect();
    log::info!(
        "crop ({}, {})-({}, {}) from {} candidates",
        rect.min.x,
        rect.min.y,
        rect.max.x,
        rect.max.y,
        result.candidates.len()
    );

    save_crop(&color, &result.region, output)?;
    log::info!("wrote {}", output.display());
    Ok(result.region)
}

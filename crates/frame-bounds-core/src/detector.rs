use serde::Serialize;

use crate::debug::{DebugSink, MaskStage, NoopSink};
use crate::{
    aggregate, build_validity_mask, normalize_rotations, smooth, Candidate, CropRegion,
    DetectError, ExposureBoundsParams, GrayImageView, ImageOps, SweepTermination, ThresholdScanner,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything a detection run produced.
#[derive(Clone, Debug, Serialize)]
pub struct ExposureBoundsResult {
    pub region: CropRegion,
    /// Accepted candidates in decreasing threshold order, as fitted.
    pub candidates: Vec<Candidate>,
    pub termination: SweepTermination,
    pub levels_scanned: usize,
}

/// Locates the exposed frame of a scanned negative or slide.
#[derive(Clone, Debug)]
pub struct ExposureBoundsDetector {
    params: ExposureBoundsParams,
}

impl ExposureBoundsDetector {
    /// Validate `params` and build a detector.
    pub fn new(params: ExposureBoundsParams) -> Result<Self, DetectError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &ExposureBoundsParams {
        &self.params
    }

    pub fn detect<O: ImageOps + ?Sized>(
        &self,
        ops: &O,
        image: &GrayImageView<'_>,
    ) -> Result<ExposureBoundsResult, DetectError> {
        self.detect_with_sink(ops, image, &mut NoopSink)
    }

    /// Like [`Self::detect`], additionally reporting intermediate products to
    /// `sink` when `params.debug` is set.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip_all,
            fields(width = image.width, height = image.height)
        )
    )]
    pub fn detect_with_sink<O: ImageOps + ?Sized>(
        &self,
        ops: &O,
        image: &GrayImageView<'_>,
        sink: &mut dyn DebugSink,
    ) -> Result<ExposureBoundsResult, DetectError> {
        check_image(image)?;
        let params = &self.params;

        let smoothed = smooth(ops, image, params.smoothing);
        let masks = build_validity_mask(ops, &smoothed.view(), &params.mask);
        if params.debug {
            sink.mask(MaskStage::Background, &masks.background);
            sink.mask(MaskStage::Unexposed, &masks.unexposed);
            sink.mask(MaskStage::Valid, &masks.valid);
        }

        let scanner = ThresholdScanner::new(
            ops,
            smoothed.view(),
            masks.valid.view(),
            params.close_kernel_size,
        );
        let outcome = scanner.sweep(params, |frame| {
            if params.debug {
                sink.sweep_frame(frame);
            }
        });

        log::info!(
            "sweep finished after {} levels ({:?}), {} candidates accepted",
            outcome.levels_scanned,
            outcome.termination,
            outcome.candidates.len()
        );

        let normalized = normalize_rotations(outcome.candidates.iter().map(|c| &c.rect));
        let region = aggregate(&normalized, params.output, &params.inset).ok_or(
            DetectError::NoCandidates {
                levels_scanned: outcome.levels_scanned,
            },
        )?;

        Ok(ExposureBoundsResult {
            region,
            candidates: outcome.candidates,
            termination: outcome.termination,
            levels_scanned: outcome.levels_scanned,
        })
    }
}

fn check_image(image: &GrayImageView<'_>) -> Result<(), DetectError> {
    if image.width == 0 || image.height == 0 {
        return Err(DetectError::EmptyImage {
            width: image.width,
            height: image.height,
        });
    }
    let expected = image.width * image.height;
    if image.data.len() != expected {
        return Err(DetectError::InvalidBuffer {
            expected,
            got: image.data.len(),
        });
    }
    Ok(())
}

/// Validate `params`, run the sweep and aggregate the accepted candidates.
///
/// Fails with [`DetectError::NoCandidates`] when no threshold level produced a
/// candidate of acceptable area.
pub fn compute_crop_region<O: ImageOps + ?Sized>(
    image: &GrayImageView<'_>,
    ops: &O,
    params: &ExposureBoundsParams,
) -> Result<CropRegion, DetectError> {
    let detector = ExposureBoundsDetector::new(params.clone())?;
    Ok(detector.detect(ops, image)?.region)
}

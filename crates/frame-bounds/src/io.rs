//! Image decode, crop and encode.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ::image::{DynamicImage, ImageError, ImageReader};

use crate::core::{CropRect, CropRegion};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("crop {rect:?} does not overlap the {width}x{height} image")]
    EmptyCrop {
        rect: CropRect,
        width: u32,
        height: u32,
    },
}

fn decode(path: &Path) -> Result<DynamicImage, IoError> {
    let to_err = |source| IoError::Decode {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(ImageError::IoError)
        .map_err(to_err)?
        .decode()
        .map_err(to_err)
}

/// Decode the image at `path` keeping its colour channels.
pub fn load_color(path: impl AsRef<Path>) -> Result<DynamicImage, IoError> {
    decode(path.as_ref())
}

/// Decode the image at `path` as 8-bit luminance.
pub fn load_gray(path: impl AsRef<Path>) -> Result<::image::GrayImage, IoError> {
    Ok(decode(path.as_ref())?.to_luma8())
}

/// Cut the region's axis-aligned box out of `image`, clipped to its bounds.
pub fn crop_image(image: &DynamicImage, region: &CropRegion) -> Result<DynamicImage, IoError> {
    let rect = region.crop_rect();
    let clipped = rect
        .clamp_to(image.width(), image.height())
        .ok_or(IoError::EmptyCrop {
            rect,
            width: image.width(),
            height: image.height(),
        })?;
    Ok(image.crop_imm(
        clipped.min.x as u32,
        clipped.min.y as u32,
        clipped.width() as u32,
        clipped.height() as u32,
    ))
}

/// Crop `image` to `region` and encode it to `path`.
///
/// The format follows the extension of `path`.
pub fn save_crop(
    image: &DynamicImage,
    region: &CropRegion,
    path: impl AsRef<Path>,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let cropped = crop_image(image, region)?;
    save_image(&cropped, path)
}

/// Encode `image` to `path`, dropping alpha for formats that cannot store it.
pub fn save_image(image: &DynamicImage, path: impl AsRef<Path>) -> Result<(), IoError> {
    let path = path.as_ref();
    let result = if is_jpeg(path) && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };
    result.map_err(|source| IoError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// `<dir>/<stem><suffix>.<ext>` next to `input`.
///
/// `ext` defaults to the input's own extension.
pub fn derived_path(input: &Path, suffix: &str, ext: Option<&str>) -> PathBuf {
    let mut name: OsString = input.file_stem().unwrap_or_default().to_os_string();
    name.push(suffix);
    let ext = ext
        .map(|e| e.trim_start_matches('.').to_owned())
        .or_else(|| input.extension().map(|e| e.to_string_lossy().into_owned()));
    if let Some(ext) = ext.filter(|e| !e.is_empty()) {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

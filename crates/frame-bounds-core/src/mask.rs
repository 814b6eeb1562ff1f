use crate::{GrayImage, GrayImageView, ImageOps, MaskParams, Smoothing};

/// Intermediate and final masks of the validity stage.
#[derive(Clone, Debug)]
pub struct ValidityMasks {
    /// Near-white pixels grown by the background margin.
    pub background: GrayImage,
    /// Near-black pixels.
    pub unexposed: GrayImage,
    /// Cells where a frame candidate may lie.
    pub valid: GrayImage,
}

/// Apply the configured pre-smoothing.
pub fn smooth<O: ImageOps + ?Sized>(
    ops: &O,
    image: &GrayImageView<'_>,
    smoothing: Smoothing,
) -> GrayImage {
    match smoothing {
        Smoothing::None => image.to_owned_image(),
        Smoothing::Gaussian { sigma } => ops.gaussian_blur(image, sigma),
        Smoothing::Bilateral {
            diameter,
            sigma_color,
            sigma_space,
        } => ops.bilateral_filter(image, diameter, sigma_color, sigma_space),
    }
}

/// Exclude saturated mount/background and unexposed stock.
///
/// The result is set only where the pixel is neither brighter than
/// `background_level` (after growing that region by `background_margin`) nor
/// darker than `unexposed_level`.
pub fn build_validity_mask<O: ImageOps + ?Sized>(
    ops: &O,
    smoothed: &GrayImageView<'_>,
    params: &MaskParams,
) -> ValidityMasks {
    let bright = match params.background_level.checked_add(1) {
        Some(low) => ops.in_range(smoothed, low, u8::MAX),
        None => GrayImage::new(smoothed.width, smoothed.height),
    };
    let background = ops.dilate(&bright.view(), params.background_margin);

    let unexposed = match params.unexposed_level.checked_sub(1) {
        Some(high) => ops.in_range(smoothed, 0, high),
        None => GrayImage::new(smoothed.width, smoothed.height),
    };

    let invalid = ops.bitwise_or(&background.view(), &unexposed.view());
    let valid = ops.bitwise_not(&invalid.view());

    ValidityMasks {
        background,
        unexposed,
        valid,
    }
}

//! Image-processing capability consumed by the sweep.
//!
//! The core never touches pixels beyond this trait. Masks are [`GrayImage`]s
//! holding [`crate::MASK_ON`] / [`crate::MASK_OFF`]; every mask-producing
//! operation must return the same dimensions as its input.

use crate::{Contour, GrayImage, GrayImageView, RotatedRect};

pub trait ImageOps {
    /// Cells with value `>= level` become set.
    fn threshold(&self, image: &GrayImageView<'_>, level: u8) -> GrayImage;

    /// Cells with `low <= value <= high` become set.
    fn in_range(&self, image: &GrayImageView<'_>, low: u8, high: u8) -> GrayImage;

    fn bitwise_and(&self, a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage;

    fn bitwise_or(&self, a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage;

    fn bitwise_not(&self, mask: &GrayImageView<'_>) -> GrayImage;

    /// Grow set regions with a `kernel_size`×`kernel_size` square whose origin
    /// is the cell `kernel_size - 1 - kernel_size / 2` on each axis.
    fn dilate(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage;

    /// Shrink set regions with a `kernel_size`×`kernel_size` square whose
    /// origin is the cell `kernel_size / 2` on each axis.
    fn erode(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage;

    fn gaussian_blur(&self, image: &GrayImageView<'_>, sigma: f32) -> GrayImage;

    fn bilateral_filter(
        &self,
        image: &GrayImageView<'_>,
        diameter: u32,
        sigma_color: f32,
        sigma_space: f32,
    ) -> GrayImage;

    /// Outer border of the external region with the largest enclosed area.
    ///
    /// Returns `None` when no region encloses a positive area.
    fn largest_external_contour(&self, mask: &GrayImageView<'_>) -> Option<Contour>;

    /// Minimal-area rotated rectangle enclosing the contour.
    fn min_area_rect(&self, contour: &Contour) -> RotatedRect;

    /// Dilation followed by erosion.
    fn close(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage {
        let grown = self.dilate(mask, kernel_size);
        self.erode(&grown.view(), kernel_size)
    }
}

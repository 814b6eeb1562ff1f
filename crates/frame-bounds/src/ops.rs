//! [`ImageOps`] backed by `image` + `imageproc`.

use frame_bounds_core::{
    Contour, GrayImage, GrayImageView, ImageOps, RotatedRect, MASK_OFF, MASK_ON, MAX_KERNEL_SIZE,
};
use image::Luma;
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};
use imageproc::geometry::min_area_rect;
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};
use imageproc::point::Point;
use nalgebra::Point2;

/// Morphology, contours and rectangle fitting from `imageproc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageprocOps;

/// Copy a core view into an `image::GrayImage`.
pub(crate) fn to_luma(view: &GrayImageView<'_>) -> image::GrayImage {
    let (w, h) = (view.width as u32, view.height as u32);
    image::GrayImage::from_raw(w, h, view.data.to_vec()).unwrap_or_else(|| {
        image::GrayImage::from_fn(w, h, |x, y| {
            let idx = y as usize * view.width + x as usize;
            Luma([view.data.get(idx).copied().unwrap_or(0)])
        })
    })
}

pub(crate) fn from_luma(img: image::GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    GrayImage {
        width: w as usize,
        height: h as usize,
        data: img.into_raw(),
    }
}

fn map_mask(image: &GrayImageView<'_>, keep: impl Fn(u8) -> bool) -> GrayImage {
    GrayImage {
        width: image.width,
        height: image.height,
        data: image
            .data
            .iter()
            .map(|&v| if keep(v) { MASK_ON } else { MASK_OFF })
            .collect(),
    }
}

fn zip_mask(
    a: &GrayImageView<'_>,
    b: &GrayImageView<'_>,
    keep: impl Fn(bool, bool) -> bool,
) -> GrayImage {
    debug_assert!(a.same_size(b));
    GrayImage {
        width: a.width,
        height: a.height,
        data: a
            .data
            .iter()
            .zip(b.data)
            .map(|(&x, &y)| {
                if keep(x != 0, y != 0) {
                    MASK_ON
                } else {
                    MASK_OFF
                }
            })
            .collect(),
    }
}

/// Apply `reduce` with a `kernel_size`×`kernel_size` square, one axis at a time.
///
/// `anchor` is the element's origin on both axes. Erosion anchors at
/// `kernel_size / 2` and dilation at the reflected cell, so a closing leaves
/// rectangles unchanged.
fn square_pass(
    mask: &GrayImageView<'_>,
    kernel_size: u32,
    anchor: impl Fn(u32) -> u32,
    reduce: fn(&image::GrayImage, &Mask) -> image::GrayImage,
) -> GrayImage {
    let size = kernel_size.min(MAX_KERNEL_SIZE);
    if size <= 1 {
        return mask.to_owned_image();
    }
    let origin = anchor(size) as u8;
    let row = image::GrayImage::from_pixel(size, 1, Luma([MASK_ON]));
    let column = image::GrayImage::from_pixel(1, size, Luma([MASK_ON]));
    let rows_done = reduce(&to_luma(mask), &Mask::from_image(&row, origin, 0));
    from_luma(reduce(&rows_done, &Mask::from_image(&column, 0, origin)))
}

impl ImageOps for ImageprocOps {
    fn threshold(&self, image: &GrayImageView<'_>, level: u8) -> GrayImage {
        map_mask(image, |v| v >= level)
    }

    fn in_range(&self, image: &GrayImageView<'_>, low: u8, high: u8) -> GrayImage {
        map_mask(image, |v| (low..=high).contains(&v))
    }

    fn bitwise_and(&self, a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage {
        zip_mask(a, b, |x, y| x && y)
    }

    fn bitwise_or(&self, a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage {
        zip_mask(a, b, |x, y| x || y)
    }

    fn bitwise_not(&self, mask: &GrayImageView<'_>) -> GrayImage {
        map_mask(mask, |v| v == 0)
    }

    fn dilate(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage {
        square_pass(mask, kernel_size, |k| k - 1 - k / 2, grayscale_dilate)
    }

    fn erode(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage {
        square_pass(mask, kernel_size, |k| k / 2, grayscale_erode)
    }

    fn gaussian_blur(&self, image: &GrayImageView<'_>, sigma: f32) -> GrayImage {
        from_luma(gaussian_blur_f32(&to_luma(image), sigma))
    }

    fn bilateral_filter(
        &self,
        image: &GrayImageView<'_>,
        diameter: u32,
        sigma_color: f32,
        sigma_space: f32,
    ) -> GrayImage {
        from_luma(bilateral_filter(
            &to_luma(image),
            diameter,
            sigma_color,
            sigma_space,
        ))
    }

    fn largest_external_contour(&self, mask: &GrayImageView<'_>) -> Option<Contour> {
        let mut best: Option<(f64, Contour)> = None;
        for raw in find_contours::<i32>(&to_luma(mask)) {
            if raw.border_type != BorderType::Outer || raw.parent.is_some() {
                continue;
            }
            let contour = Contour::new(raw.points.iter().map(|p| Point2::new(p.x, p.y)).collect());
            let area = contour.area();
            if area > best.as_ref().map_or(0.0, |(a, _)| *a) {
                best = Some((area, contour));
            }
        }
        best.map(|(_, contour)| contour)
    }

    fn min_area_rect(&self, contour: &Contour) -> RotatedRect {
        if contour.is_empty() {
            return RotatedRect::new(Point2::origin(), 0.0, 0.0, 0.0);
        }
        let points: Vec<Point<i32>> = contour.points.iter().map(|p| Point::new(p.x, p.y)).collect();
        let corners = min_area_rect(&points);
        RotatedRect::from_box_points(corners.map(|p| Point2::new(p.x as f32, p.y as f32)))
    }
}

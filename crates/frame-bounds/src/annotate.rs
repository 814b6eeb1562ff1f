//! Outline the detected frame on the scan.

use std::path::Path;

use ::image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::core::{CropRegion, ExposureBoundsParams};
use crate::detect::detect_exposure_bounds;
use crate::error::CropError;
use crate::io::{load_color, save_image};

/// Outline colour used by [`annotate_file`].
pub const OUTLINE: Rgb<u8> = Rgb([255, 0, 255]);

/// Draw a closed polygon through `corners` with a square pen of `thickness` px.
pub fn draw_polygon(
    canvas: &mut RgbImage,
    corners: &[(f32, f32)],
    colour: Rgb<u8>,
    thickness: u32,
) {
    if corners.len() < 2 {
        return;
    }
    let half = (thickness.max(1) as i32 - 1) / 2;
    for (i, &start) in corners.iter().enumerate() {
        let end = corners[(i + 1) % corners.len()];
        for dy in -half..=half {
            for dx in -half..=half {
                let (ox, oy) = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    canvas,
                    (start.0 + ox, start.1 + oy),
                    (end.0 + ox, end.1 + oy),
                    colour,
                );
            }
        }
    }
}

/// Corner polygon of a region in drawing order.
pub fn region_outline(region: &CropRegion) -> [(f32, f32); 4] {
    match region {
        CropRegion::Oriented(bounds) => bounds.corners.map(|p| (p.x as f32, p.y as f32)),
        CropRegion::AxisAligned(rect) => {
            let (x0, y0) = (rect.min.x as f32, rect.min.y as f32);
            let (x1, y1) = ((rect.max.x - 1) as f32, (rect.max.y - 1) as f32);
            [(x0, y1), (x0, y0), (x1, y0), (x1, y1)]
        }
    }
}

/// Draw `region` onto a copy of `image`.
pub fn draw_region(image: &DynamicImage, region: &CropRegion, thickness: u32) -> RgbImage {
    let mut canvas = image.to_rgb8();
    draw_polygon(&mut canvas, &region_outline(region), OUTLINE, thickness);
    canvas
}

/// Detect the frame in `input`, outline it and write the result to `output`.
pub fn annotate_file(
    input: &Path,
    output: &Path,
    params: &ExposureBoundsParams,
) -> Result<CropRegion, CropError> {
    let color = load_color(input)?;
    let gray = color.to_luma8();
    let result = detect_exposure_bounds(&gray, params)?;

    let thickness = (color.width().max(color.height()) / 500).max(2);
    let canvas = draw_region(&color, &result.region, thickness);
    save_image(&DynamicImage::ImageRgb8(canvas), output)?;
    log::info!("annotated {} -> {}", input.display(), output.display());
    Ok(result.region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CropRect;
    use nalgebra::Point2;

    #[test]
    fn outline_of_axis_aligned_region_is_drawn_inside() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 30));
        let region = CropRegion::AxisAligned(CropRect::new(Point2::new(5, 5), Point2::new(35, 25)));
        let out = draw_region(&img, &region, 1);

        assert_eq!(*out.get_pixel(5, 5), OUTLINE);
        assert_eq!(*out.get_pixel(34, 24), OUTLINE);
        assert_eq!(*out.get_pixel(20, 5), OUTLINE);
        assert_eq!(*out.get_pixel(20, 15), Rgb([0, 0, 0]));
    }

    #[test]
    fn thick_pen_widens_the_line() {
        let mut canvas = RgbImage::new(20, 20);
        draw_polygon(&mut canvas, &[(2.0, 10.0), (17.0, 10.0)], OUTLINE, 3);
        assert_eq!(*canvas.get_pixel(10, 9), OUTLINE);
        assert_eq!(*canvas.get_pixel(10, 11), OUTLINE);
        assert_eq!(*canvas.get_pixel(10, 13), Rgb([0, 0, 0]));
    }
}

//! Slow, obviously-correct `ImageOps` for unit tests on small synthetic scans.
//!
//! Region extraction only supports axis-aligned rectangular blobs: the
//! contour of a component is its bounding box.

use nalgebra::Point2;

use crate::{Contour, GrayImage, GrayImageView, ImageOps, RotatedRect, MASK_OFF, MASK_ON};

pub(crate) struct NaiveOps;

fn map_pixels(image: &GrayImageView<'_>, f: impl Fn(u8) -> bool) -> GrayImage {
    GrayImage {
        width: image.width,
        height: image.height,
        data: image
            .data
            .iter()
            .map(|&v| if f(v) { MASK_ON } else { MASK_OFF })
            .collect(),
    }
}

fn zip_pixels(
    a: &GrayImageView<'_>,
    b: &GrayImageView<'_>,
    f: impl Fn(bool, bool) -> bool,
) -> GrayImage {
    assert!(a.same_size(b));
    GrayImage {
        width: a.width,
        height: a.height,
        data: a
            .data
            .iter()
            .zip(b.data)
            .map(|(&x, &y)| if f(x != 0, y != 0) { MASK_ON } else { MASK_OFF })
            .collect(),
    }
}

/// `kernel_size`×`kernel_size` window; erosion is anchored at `k / 2` and
/// dilation at the reflected cell.
fn square_morph(mask: &GrayImageView<'_>, kernel_size: u32, grow: bool) -> GrayImage {
    let k = kernel_size.max(1) as i64;
    let lo = if grow { -(k - 1 - k / 2) } else { -(k / 2) };
    let hi = lo + k - 1;
    let (w, h) = (mask.width as i64, mask.height as i64);
    let mut out = GrayImage::new(mask.width, mask.height);
    for y in 0..h {
        for x in 0..w {
            let mut hit = !grow;
            'window: for dy in lo..=hi {
                for dx in lo..=hi {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= w || ny >= h {
                        continue;
                    }
                    let set = mask.get(nx as usize, ny as usize) != 0;
                    if grow && set {
                        hit = true;
                        break 'window;
                    }
                    if !grow && !set {
                        hit = false;
                        break 'window;
                    }
                }
            }
            if hit {
                out.set(x as usize, y as usize, MASK_ON);
            }
        }
    }
    out
}

impl ImageOps for NaiveOps {
    fn threshold(&self, image: &GrayImageView<'_>, level: u8) -> GrayImage {
        map_pixels(image, |v| v >= level)
    }

    fn in_range(&self, image: &GrayImageView<'_>, low: u8, high: u8) -> GrayImage {
        map_pixels(image, |v| v >= low && v <= high)
    }

    fn bitwise_and(&self, a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage {
        zip_pixels(a, b, |x, y| x && y)
    }

    fn bitwise_or(&self, a: &GrayImageView<'_>, b: &GrayImageView<'_>) -> GrayImage {
        zip_pixels(a, b, |x, y| x || y)
    }

    fn bitwise_not(&self, mask: &GrayImageView<'_>) -> GrayImage {
        map_pixels(mask, |v| v == 0)
    }

    fn dilate(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage {
        square_morph(mask, kernel_size, true)
    }

    fn erode(&self, mask: &GrayImageView<'_>, kernel_size: u32) -> GrayImage {
        square_morph(mask, kernel_size, false)
    }

    fn gaussian_blur(&self, image: &GrayImageView<'_>, _sigma: f32) -> GrayImage {
        image.to_owned_image()
    }

    fn bilateral_filter(
        &self,
        image: &GrayImageView<'_>,
        _diameter: u32,
        _sigma_color: f32,
        _sigma_space: f32,
    ) -> GrayImage {
        image.to_owned_image()
    }

    fn largest_external_contour(&self, mask: &GrayImageView<'_>) -> Option<Contour> {
        let (w, h) = (mask.width, mask.height);
        let mut seen = vec![false; w * h];
        let mut best: Option<(f64, Contour)> = None;

        for start in 0..w * h {
            if seen[start] || mask.data[start] == 0 {
                continue;
            }
            seen[start] = true;
            let mut stack = vec![start];
            let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0, 0);
            while let Some(idx) = stack.pop() {
                let (x, y) = (idx % w, idx / w);
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x);
                y1 = y1.max(y);
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                            continue;
                        }
                        let n = ny as usize * w + nx as usize;
                        if !seen[n] && mask.data[n] != 0 {
                            seen[n] = true;
                            stack.push(n);
                        }
                    }
                }
            }

            let contour = Contour::new(vec![
                Point2::new(x0 as i32, y0 as i32),
                Point2::new(x1 as i32, y0 as i32),
                Point2::new(x1 as i32, y1 as i32),
                Point2::new(x0 as i32, y1 as i32),
            ]);
            let area = contour.area();
            if area > best.as_ref().map_or(0.0, |(a, _)| *a) {
                best = Some((area, contour));
            }
        }

        best.map(|(_, c)| c)
    }

    fn min_area_rect(&self, contour: &Contour) -> RotatedRect {
        let mut pts = [Point2::new(0.0f32, 0.0); 4];
        for (dst, src) in pts.iter_mut().zip(contour.points.iter().cycle()) {
            *dst = Point2::new(src.x as f32, src.y as f32);
        }
        RotatedRect::from_box_points(pts)
    }
}

/// `width`×`height` scan: white mount of `border` px around a uniform frame.
pub(crate) fn framed_scan(
    width: usize,
    height: usize,
    border: usize,
    frame_value: u8,
) -> GrayImage {
    let mut img = GrayImage::filled(width, height, 250);
    for y in border..height - border {
        for x in border..width - border {
            img.set(x, y, frame_value);
        }
    }
    img
}

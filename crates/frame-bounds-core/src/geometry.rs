//! Rectangles produced and consumed by the sweep.
//!
//! Rotated rectangles follow the classic rotated-box corner convention: the
//! width side runs along the angle, and for a zero angle the corners are
//! bottom-left, top-left, top-right, bottom-right in image coordinates
//! (y pointing down). Fitted angles always lie in `(-90, 0]` degrees.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Closed polygon traced along the outer border of a connected region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed polygon area (shoelace formula), always non-negative.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0i64;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        (twice as f64 * 0.5).abs()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Axis-aligned pixel rectangle, `min` inclusive and `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub min: Point2<i32>,
    pub max: Point2<i32>,
}

impl CropRect {
    pub fn new(min: Point2<i32>, max: Point2<i32>) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Intersect with the `width`×`height` image area.
    ///
    /// Returns `None` when nothing of the rectangle remains inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CropRect> {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        let clamped = CropRect {
            min: Point2::new(self.min.x.clamp(0, w), self.min.y.clamp(0, h)),
            max: Point2::new(self.max.x.clamp(0, w), self.max.y.clamp(0, h)),
        };
        (!clamped.is_empty()).then_some(clamped)
    }
}

/// Corner points of a rotated box with the given center, size, and angle (degrees).
pub fn box_points(
    center: Point2<f32>,
    width: f32,
    height: f32,
    angle_deg: f32,
) -> [Point2<f32>; 4] {
    let theta = angle_deg.to_radians();
    let a = theta.sin() * 0.5;
    let b = theta.cos() * 0.5;

    let p0 = Point2::new(
        center.x - a * height - b * width,
        center.y + b * height - a * width,
    );
    let p1 = Point2::new(
        center.x + a * height - b * width,
        center.y - b * height - a * width,
    );
    let p2 = Point2::new(2.0 * center.x - p0.x, 2.0 * center.y - p0.y);
    let p3 = Point2::new(2.0 * center.x - p1.x, 2.0 * center.y - p1.y);
    [p0, p1, p2, p3]
}

/// Oriented rectangle as produced by minimal-area fitting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    /// Corner labeling is fit-dependent; see [`crate::normalize_rotations`].
    pub corners: [Point2<f32>; 4],
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    /// Degrees.
    pub angle: f32,
    /// Pixel-aligned box enclosing all corners.
    pub bounds: CropRect,
}

impl RotatedRect {
    pub fn new(center: Point2<f32>, width: f32, height: f32, angle_deg: f32) -> Self {
        let corners = box_points(center, width, height, angle_deg);
        Self {
            corners,
            center,
            width,
            height,
            angle: angle_deg,
            bounds: enclosing_box(&corners),
        }
    }

    /// Build the canonical description of a rectangle given its four corners
    /// in any order.
    ///
    /// The width side is the one whose direction folds into `(-90, 0]`
    /// degrees, which becomes the angle.
    pub fn from_box_points(points: [Point2<f32>; 4]) -> Self {
        let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
        let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;
        let center = Point2::new(cx, cy);

        let mut ordered = points;
        ordered.sort_by(|p, q| {
            let ap = (p.y - cy).atan2(p.x - cx);
            let aq = (q.y - cy).atan2(q.x - cx);
            ap.total_cmp(&aq)
        });

        let mut e0: Vector2<f32> = ordered[1] - ordered[0];
        let mut e1: Vector2<f32> = ordered[2] - ordered[1];
        if e0.norm() <= f32::EPSILON && e1.norm() > f32::EPSILON {
            std::mem::swap(&mut e0, &mut e1);
        }

        let mut alpha = e0.y.atan2(e0.x).to_degrees();
        if alpha > 90.0 {
            alpha -= 180.0;
        } else if alpha <= -90.0 {
            alpha += 180.0;
        }

        let (angle, width, height) = if alpha <= 0.0 {
            (alpha, e0.norm(), e1.norm())
        } else {
            (alpha - 90.0, e1.norm(), e0.norm())
        };

        Self::new(center, width, height, angle)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

pub(crate) fn enclosing_box(points: &[Point2<f32>]) -> CropRect {
    let mut min = Point2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Point2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    CropRect {
        min: Point2::new(min.x.floor() as i32, min.y.floor() as i32),
        max: Point2::new(max.x.ceil() as i32, max.y.ceil() as i32),
    }
}

/// Aggregated oriented rectangle, coordinates truncated to whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedBounds {
    pub corners: [Point2<i32>; 4],
    pub center: Point2<i32>,
    pub width: i32,
    pub height: i32,
    /// Degrees.
    pub angle: f32,
    pub bounds: CropRect,
}

/// Final output of the detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CropRegion {
    AxisAligned(CropRect),
    Oriented(OrientedBounds),
}

impl CropRegion {
    /// Rectangle to cut out of the source image.
    pub fn crop_rect(&self) -> CropRect {
        match self {
            CropRegion::AxisAligned(rect) => *rect,
            CropRegion::Oriented(oriented) => oriented.bounds,
        }
    }
}

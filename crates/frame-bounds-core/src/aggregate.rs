//! Robust aggregation of accepted candidates.
//!
//! Every attribute (each corner's x and y separately, center, size, angle,
//! bounding box) is reduced by its own median, so one badly fitted candidate
//! cannot drag the result.

use nalgebra::Point2;

use crate::{CropInset, CropRect, CropRegion, NormalizedRect, OrientedBounds, OutputMode};

/// `p`-quantile with linear interpolation between closest ranks.
///
/// Sorts `values` in place. Uses `h = (n - 1) * p`, so the median of an odd
/// count is the middle sample and of an even count the mean of the two
/// middle samples. Returns `None` for an empty slice.
pub fn percentile(values: &mut [f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let h = (values.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let t = h - lo as f64;
    Some(values[lo] + (values[hi] - values[lo]) * t)
}

pub fn median(values: &mut [f64]) -> Option<f64> {
    percentile(values, 0.5)
}

fn median_of<F>(rects: &[NormalizedRect], f: F) -> Option<f64>
where
    F: Fn(&NormalizedRect) -> f64,
{
    let mut values: Vec<f64> = rects.iter().map(f).collect();
    median(&mut values)
}

/// Componentwise median of each corner index: eight independent medians.
pub fn median_corners(rects: &[NormalizedRect]) -> Option<[Point2<f64>; 4]> {
    let mut out = [Point2::origin(); 4];
    for (k, corner) in out.iter_mut().enumerate() {
        *corner = Point2::new(
            median_of(rects, |r| r.rect().corners[k].x as f64)?,
            median_of(rects, |r| r.rect().corners[k].y as f64)?,
        );
    }
    Some(out)
}

/// Crop box from the median corners, nudged inward by `inset`.
pub fn aggregate_axis_aligned(rects: &[NormalizedRect], inset: &CropInset) -> Option<CropRect> {
    let [c0, c1, c2, c3] = median_corners(rects)?;
    let min = Point2::new(
        ((c1.x + c0.x) / 2.0 * inset.min_scale) as i32,
        ((c1.y + c2.y) / 2.0 * inset.min_scale) as i32,
    );
    let max = Point2::new(
        ((c3.x + c2.x) / 2.0 * inset.max_scale) as i32,
        ((c3.y + c0.y) / 2.0 * inset.max_scale) as i32,
    );
    Some(CropRect { min, max })
}

/// Full oriented rectangle from per-attribute medians.
pub fn aggregate_oriented(rects: &[NormalizedRect]) -> Option<OrientedBounds> {
    let corners = median_corners(rects)?.map(|c| Point2::new(c.x as i32, c.y as i32));
    let center = Point2::new(
        median_of(rects, |r| r.rect().center.x as f64)? as i32,
        median_of(rects, |r| r.rect().center.y as f64)? as i32,
    );
    let bounds = CropRect {
        min: Point2::new(
            median_of(rects, |r| r.rect().bounds.min.x as f64)? as i32,
            median_of(rects, |r| r.rect().bounds.min.y as f64)? as i32,
        ),
        max: Point2::new(
            median_of(rects, |r| r.rect().bounds.max.x as f64)? as i32,
            median_of(rects, |r| r.rect().bounds.max.y as f64)? as i32,
        ),
    };

    Some(OrientedBounds {
        corners,
        center,
        width: median_of(rects, |r| r.rect().width as f64)? as i32,
        height: median_of(rects, |r| r.rect().height as f64)? as i32,
        angle: median_of(rects, |r| r.rect().angle as f64)? as f32,
        bounds,
    })
}

/// Aggregate in the requested mode; `None` when there is nothing to aggregate.
pub fn aggregate(
    rects: &[NormalizedRect],
    mode: OutputMode,
    inset: &CropInset,
) -> Option<CropRegion> {
    match mode {
        OutputMode::AxisAligned => {
            aggregate_axis_aligned(rects, inset).map(CropRegion::AxisAligned)
        }
        OutputMode::Oriented => aggregate_oriented(rects).map(CropRegion::Oriented),
    }
}

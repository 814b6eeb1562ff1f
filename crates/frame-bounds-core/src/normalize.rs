use serde::Serialize;

use crate::RotatedRect;

/// Fit angles below this are relabeled by one corner position.
pub const RELABEL_BELOW_DEG: f32 = -45.0;

/// A rotated rectangle whose corner indices refer to the same geometric
/// corner as in every other normalized rectangle.
///
/// Only [`normalize_rotation`] constructs this type.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NormalizedRect(RotatedRect);

impl NormalizedRect {
    pub fn rect(&self) -> &RotatedRect {
        &self.0
    }

    pub fn into_inner(self) -> RotatedRect {
        self.0
    }
}

/// Relabel a fitted rectangle into the canonical corner order.
///
/// For `angle < -45` the corners shift by one position (`i <- i + 1 mod 4`),
/// the angle gains 90 degrees and width/height swap, so all four descriptions
/// still denote the same rectangle.
pub fn normalize_rotation(rect: &RotatedRect) -> NormalizedRect {
    if rect.angle >= RELABEL_BELOW_DEG {
        return NormalizedRect(*rect);
    }
    let [c0, c1, c2, c3] = rect.corners;
    NormalizedRect(RotatedRect {
        corners: [c1, c2, c3, c0],
        angle: rect.angle + 90.0,
        width: rect.height,
        height: rect.width,
        ..*rect
    })
}

pub fn normalize_rotations<'a, I>(rects: I) -> Vec<NormalizedRect>
where
    I: IntoIterator<Item = &'a RotatedRect>,
{
    rects.into_iter().map(normalize_rotation).collect()
}

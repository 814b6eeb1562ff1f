//! Core types and the exposure-bounds sweep for scanned film frames.
//!
//! This crate does not depend on any concrete image library. All pixel work
//! goes through the [`ImageOps`] capability trait; the `frame-bounds` crate
//! binds it to `image` + `imageproc`.
//!
//! Algorithm:
//! 1. Smooth the luminance image (bilateral by default).
//! 2. Build a validity mask that excludes the bright mount (grown by a
//!    margin) and near-black unexposed stock.
//! 3. Sweep the threshold from 240 down in steps of 5. At each level keep
//!    valid pixels at or above the level, close the result, and fit a
//!    minimal-area rectangle to the largest external region.
//! 4. Accept candidates with `min_capture_area <= area < max_area`; stop as
//!    soon as a region reaches `max_area`.
//! 5. Relabel corners of steeply-angled fits so indices agree, then take
//!    per-attribute medians of the accepted candidates.

mod aggregate;
mod debug;
mod detector;
mod error;
mod geometry;
mod image;
mod logger;
mod mask;
mod normalize;
mod ops;
mod params;
mod scan;

#[cfg(test)]
pub(crate) mod test_utils;

pub use aggregate::{
    aggregate, aggregate_axis_aligned, aggregate_oriented, median, median_corners, percentile,
};
pub use debug::{DebugSink, MaskStage, NoopSink, SweepFrame};
pub use detector::{compute_crop_region, ExposureBoundsDetector, ExposureBoundsResult};
pub use error::{DetectError, ParamsError};
pub use geometry::{box_points, Contour, CropRect, CropRegion, OrientedBounds, RotatedRect};
pub use image::{GrayImage, GrayImageView, MASK_OFF, MASK_ON};
pub use mask::{build_validity_mask, smooth, ValidityMasks};
pub use normalize::{normalize_rotation, normalize_rotations, NormalizedRect, RELABEL_BELOW_DEG};
pub use ops::ImageOps;
pub use params::{
    CropInset, ExposureBoundsParams, MaskParams, OutputMode, Smoothing, MAX_KERNEL_SIZE,
};
pub use scan::{
    run_sweep, threshold_levels, AreaFilter, Candidate, CandidateDecision, LevelOutcome,
    SweepOutcome, SweepTermination, ThresholdScanner,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

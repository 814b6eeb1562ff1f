//! Find and crop the exposed frame of scanned film negatives and slides.
//!
//! This crate provides:
//! - re-exports of the image-library-free core (`frame-bounds-core`)
//! - (feature `image`) an `imageproc` binding of the core's pixel operations
//!   plus file helpers that decode a scan, detect its frame and write the crop.
//!
//! ## Quickstart
//!
//! ```no_run
//! use frame_bounds::detect;
//! use frame_bounds::ExposureBoundsParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gray = frame_bounds::io::load_gray("scan.tif")?;
//! let region = detect::compute_crop_region(&gray, &ExposureBoundsParams::default())?;
//! println!("crop: {:?}", region.crop_rect());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `frame_bounds::core`: images, geometry, parameters and the threshold sweep.
//! - `frame_bounds::ops` (feature `image`): [`ops::ImageprocOps`].
//! - `frame_bounds::detect` (feature `image`): end-to-end helpers from `image::GrayImage`.
//! - `frame_bounds::io`, `config`, `debug`, `annotate` (feature `image`): files,
//!   JSON parameters, PNG debug dumps and outline drawing.

pub use frame_bounds_core as core;

pub use frame_bounds_core::{
    CropRect, CropRegion, DetectError, ExposureBoundsParams, ExposureBoundsResult, OutputMode,
    ParamsError,
};

#[cfg(feature = "image")]
pub mod annotate;
#[cfg(feature = "image")]
pub mod config;
#[cfg(feature = "image")]
pub mod debug;
#[cfg(feature = "image")]
pub mod detect;
#[cfg(feature = "image")]
mod error;
#[cfg(feature = "image")]
pub mod io;
#[cfg(feature = "image")]
pub mod ops;

#[cfg(feature = "image")]
pub use error::CropError;

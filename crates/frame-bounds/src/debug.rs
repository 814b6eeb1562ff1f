//! PNG dumps of the intermediate masks and sweep levels.

use std::fs;
use std::path::{Path, PathBuf};

use ::image::{Rgb, RgbImage};

use crate::annotate::draw_polygon;
use crate::core::{CandidateDecision, DebugSink, GrayImage, MaskStage, SweepFrame};
use crate::ops::to_luma;

const ACCEPTED: Rgb<u8> = Rgb([0, 255, 0]);
const REJECTED: Rgb<u8> = Rgb([255, 0, 0]);

/// Writes `mask_<stage>.png` and `level_<LLL>.png` files into a directory.
///
/// Failures are logged and skipped; they never abort a detection.
#[derive(Debug)]
pub struct PngDebugSink {
    dir: PathBuf,
    written: usize,
}

impl PngDebugSink {
    /// Create `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn write(&mut self, name: String, image: impl FnOnce() -> RgbImage) {
        let path = self.dir.join(name);
        match image().save(&path) {
            Ok(()) => self.written += 1,
            Err(err) => log::warn!("failed to write debug image {}: {err}", path.display()),
        }
    }
}

fn gray_to_rgb(mask: &GrayImage) -> RgbImage {
    ::image::DynamicImage::ImageLuma8(to_luma(&mask.view())).to_rgb8()
}

impl DebugSink for PngDebugSink {
    fn mask(&mut self, stage: MaskStage, mask: &GrayImage) {
        self.write(format!("mask_{}.png", stage.name()), || gray_to_rgb(mask));
    }

    fn sweep_frame(&mut self, frame: &SweepFrame<'_>) {
        self.write(format!("level_{:03}.png", frame.level), || {
            let mut canvas = gray_to_rgb(frame.binary);
            if let Some(candidate) = frame.candidate {
                let colour = match frame.decision {
                    CandidateDecision::Accept => ACCEPTED,
                    CandidateDecision::Reject | CandidateDecision::Stop => REJECTED,
                };
                let corners = candidate.rect.corners.map(|p| (p.x, p.y));
                draw_polygon(&mut canvas, &corners, colour, 3);
            }
            canvas
        });
    }
}

//! Diagnostic side channel.
//!
//! Sinks observe intermediate products of a run. They cannot influence it:
//! every hook takes shared references and returns nothing.

use crate::{Candidate, CandidateDecision, GrayImage};

/// Which intermediate mask is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskStage {
    /// Near-white mount/background, already grown by the margin.
    Background,
    /// Near-black unexposed stock.
    Unexposed,
    /// Final validity mask.
    Valid,
}

impl MaskStage {
    pub fn name(self) -> &'static str {
        match self {
            MaskStage::Background => "background",
            MaskStage::Unexposed => "unexposed",
            MaskStage::Valid => "valid",
        }
    }
}

/// Everything the sweep knows about one threshold level.
#[derive(Debug)]
pub struct SweepFrame<'a> {
    pub level: u8,
    /// Thresholded, masked and closed binary image.
    pub binary: &'a GrayImage,
    pub candidate: Option<&'a Candidate>,
    pub decision: CandidateDecision,
}

pub trait DebugSink {
    fn mask(&mut self, _stage: MaskStage, _mask: &GrayImage) {}

    fn sweep_frame(&mut self, _frame: &SweepFrame<'_>) {}
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DebugSink for NoopSink {}

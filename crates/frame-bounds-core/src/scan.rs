//! Threshold sweep and area-based candidate filtering.
//!
//! The sweep walks the threshold level downward. Every level proposes at most
//! one candidate (the largest external region inside the validity mask); the
//! area filter then accepts it, rejects it, or ends the sweep because the
//! region already covers the whole frame.

use serde::{Deserialize, Serialize};

use crate::debug::SweepFrame;
use crate::{ExposureBoundsParams, GrayImage, GrayImageView, ImageOps, RotatedRect};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Frame proposal produced at one threshold level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub level: u8,
    pub rect: RotatedRect,
    /// Area enclosed by the region's outer contour.
    pub area: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateDecision {
    /// Region covers the whole frame; nothing useful remains at lower levels.
    Stop,
    Accept,
    Reject,
}

/// Area window a candidate must fall into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaFilter {
    pub max_area: f64,
    pub min_capture_area: f64,
}

impl AreaFilter {
    pub fn new(max_area: f64, min_capture_area: f64) -> Self {
        Self {
            max_area,
            min_capture_area,
        }
    }

    pub fn for_image(params: &ExposureBoundsParams, width: usize, height: usize) -> Self {
        let (max_area, min_capture_area) = params.area_limits(width, height);
        Self::new(max_area, min_capture_area)
    }

    /// Both bounds are inclusive: `area == max_area` stops the sweep and
    /// `area == min_capture_area` is accepted.
    pub fn classify(&self, area: f64) -> CandidateDecision {
        if area >= self.max_area {
            CandidateDecision::Stop
        } else if area >= self.min_capture_area {
            CandidateDecision::Accept
        } else {
            CandidateDecision::Reject
        }
    }
}

/// How the sweep ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepTermination {
    /// A level produced a region at least as large as `max_area`.
    FrameFilled { level: u8 },
    /// Every level down to the last positive one was visited.
    Exhausted,
}

#[derive(Clone, Debug)]
pub struct SweepOutcome {
    /// Accepted candidates in decreasing level order.
    pub candidates: Vec<Candidate>,
    pub termination: SweepTermination,
    pub levels_scanned: usize,
}

/// Closed binary image and candidate for one level.
#[derive(Clone, Debug)]
pub struct LevelOutcome {
    pub binary: GrayImage,
    pub candidate: Option<Candidate>,
}

/// Levels `start, start - step, ...` down to the last positive one.
pub fn threshold_levels(start: u8, step: u8) -> impl Iterator<Item = u8> {
    std::iter::successors((start > 0).then_some(start), move |&level| {
        level.checked_sub(step).filter(|&next| next > 0 && step > 0)
    })
}

/// Drive the sweep over `levels`.
///
/// `scan_level` produces the candidate for a level; `observe` sees every level
/// together with the filter decision and cannot change the outcome.
pub fn run_sweep<I, F, G>(
    levels: I,
    filter: &AreaFilter,
    mut scan_level: F,
    mut observe: G,
) -> SweepOutcome
where
    I: IntoIterator<Item = u8>,
    F: FnMut(u8) -> LevelOutcome,
    G: FnMut(&SweepFrame<'_>),
{
    let mut candidates = Vec::new();
    let mut levels_scanned = 0usize;

    for level in levels {
        levels_scanned += 1;
        let LevelOutcome { binary, candidate } = scan_level(level);
        let decision = candidate
            .as_ref()
            .map_or(CandidateDecision::Reject, |c| filter.classify(c.area));

        log::debug!(
            "level {:3}: area {:>12.1} -> {:?}",
            level,
            candidate.as_ref().map_or(0.0, |c| c.area),
            decision
        );

        observe(&SweepFrame {
            level,
            binary: &binary,
            candidate: candidate.as_ref(),
            decision,
        });

        match decision {
            CandidateDecision::Stop => {
                return SweepOutcome {
                    candidates,
                    termination: SweepTermination::FrameFilled { level },
                    levels_scanned,
                };
            }
            CandidateDecision::Accept => candidates.extend(candidate),
            CandidateDecision::Reject => {}
        }
    }

    SweepOutcome {
        candidates,
        termination: SweepTermination::Exhausted,
        levels_scanned,
    }
}

/// Per-level thresholding on a smoothed image restricted to a validity mask.
pub struct ThresholdScanner<'a, O: ImageOps + ?Sized> {
    ops: &'a O,
    image: GrayImageView<'a>,
    valid: GrayImageView<'a>,
    close_kernel_size: u32,
}

impl<'a, O: ImageOps + ?Sized> ThresholdScanner<'a, O> {
    pub fn new(
        ops: &'a O,
        image: GrayImageView<'a>,
        valid: GrayImageView<'a>,
        close_kernel_size: u32,
    ) -> Self {
        debug_assert!(image.same_size(&valid));
        Self {
            ops,
            image,
            valid,
            close_kernel_size,
        }
    }

    /// Binarize at `level`, keep valid cells, close, and fit the largest region.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn scan_level(&self, level: u8) -> LevelOutcome {
        let binary = self.ops.threshold(&self.image, level);
        let masked = self.ops.bitwise_and(&binary.view(), &self.valid);
        let closed = self.ops.close(&masked.view(), self.close_kernel_size);

        let candidate = self
            .ops
            .largest_external_contour(&closed.view())
            .map(|contour| Candidate {
                level,
                area: contour.area(),
                rect: self.ops.min_area_rect(&contour),
            });

        LevelOutcome {
            binary: closed,
            candidate,
        }
    }

    /// Run the full sweep described by `params`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip_all,
            fields(width = self.image.width, height = self.image.height)
        )
    )]
    pub fn sweep<G>(&self, params: &ExposureBoundsParams, observe: G) -> SweepOutcome
    where
        G: FnMut(&SweepFrame<'_>),
    {
        let filter = AreaFilter::for_image(params, self.image.width, self.image.height);
        run_sweep(
            threshold_levels(params.start_level, params.threshold_step),
            &filter,
            |level| self.scan_level(level),
            observe,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{framed_scan, NaiveOps};
    use nalgebra::Point2;

    fn candidate(level: u8, area: f64) -> Candidate {
        Candidate {
            level,
            rect: RotatedRect::new(Point2::new(50.0, 50.0), 80.0, 80.0, 0.0),
            area,
        }
    }

    fn scripted(areas: Vec<(u8, Option<f64>)>) -> impl FnMut(u8) -> LevelOutcome {
        move |level| {
            let area = areas
                .iter()
                .find(|(l, _)| *l == level)
                .and_then(|(_, a)| *a);
            LevelOutcome {
                binary: GrayImage::new(0, 0),
                candidate: area.map(|a| candidate(level, a)),
            }
        }
    }

    #[test]
    fn levels_step_down_to_last_positive() {
        let levels: Vec<u8> = threshold_levels(240, 5).collect();
        assert_eq!(levels.len(), 48);
        assert_eq!(levels.first(), Some(&240));
        assert_eq!(levels.last(), Some(&5));

        let odd: Vec<u8> = threshold_levels(12, 5).collect();
        assert_eq!(odd, vec![12, 7, 2]);
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = AreaFilter::new(1000.0, 850.0);
        assert_eq!(filter.classify(1000.0), CandidateDecision::Stop);
        assert_eq!(filter.classify(999.9), CandidateDecision::Accept);
        assert_eq!(filter.classify(850.0), CandidateDecision::Accept);
        assert_eq!(filter.classify(849.9), CandidateDecision::Reject);
    }

    #[test]
    fn sweep_accepts_exact_min_and_stops_on_exact_max() {
        let filter = AreaFilter::new(1000.0, 850.0);
        let script = scripted(vec![
            (20, None),
            (15, Some(850.0)),
            (10, Some(100.0)),
            (5, Some(1000.0)),
        ]);
        let out = run_sweep([20u8, 15, 10, 5, 1], &filter, script, |_| {});

        assert_eq!(out.termination, SweepTermination::FrameFilled { level: 5 });
        assert_eq!(out.levels_scanned, 4);
        assert_eq!(out.candidates.len(), 1);
        assert_eq!(out.candidates[0].level, 15);
    }

    #[test]
    fn sweep_exhausts_when_frame_never_fills() {
        let filter = AreaFilter::new(1000.0, 850.0);
        let script = scripted(vec![(30, Some(900.0)), (20, Some(950.0)), (10, Some(10.0))]);
        let mut seen = Vec::new();
        let out = run_sweep([30u8, 20, 10], &filter, script, |frame| {
            seen.push((frame.level, frame.decision))
        });

        assert_eq!(out.termination, SweepTermination::Exhausted);
        let levels: Vec<u8> = out.candidates.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![30, 20]);
        assert_eq!(
            seen,
            vec![
                (30, CandidateDecision::Accept),
                (20, CandidateDecision::Accept),
                (10, CandidateDecision::Reject)
            ]
        );
    }

    #[test]
    fn scanner_finds_frame_inside_mount() {
        // Mount border of 10 px around a 140-valued frame.
        let img = framed_scan(100, 80, 10, 140);
        let masks =
            crate::build_validity_mask(&NaiveOps, &img.view(), &crate::MaskParams::default());
        let params = ExposureBoundsParams {
            area_fraction_max: 0.95,
            area_fraction_min: 0.5,
            close_kernel_size: 3,
            ..ExposureBoundsParams::default()
        };
        let scanner = ThresholdScanner::new(&NaiveOps, img.view(), masks.valid.view(), 3);
        let out = scanner.sweep(&params, |_| {});

        assert_eq!(out.termination, SweepTermination::Exhausted);
        assert_eq!(out.levels_scanned, 48);
        // Levels 140 down to 5 see the frame minus the 2 px margin growth.
        assert_eq!(out.candidates.len(), 28);
        let first = &out.candidates[0];
        assert_eq!(first.level, 140);
        assert_eq!(first.rect.bounds.min, Point2::new(12, 12));
        assert_eq!(first.rect.bounds.max, Point2::new(87, 67));
    }
}

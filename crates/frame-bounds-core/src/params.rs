use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Edge-preserving or plain smoothing applied before masking and thresholding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothing {
    None,
    Gaussian {
        sigma: f32,
    },
    Bilateral {
        /// Neighbourhood diameter in pixels.
        diameter: u32,
        sigma_color: f32,
        sigma_space: f32,
    },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Bilateral {
            diameter: 11,
            sigma_color: 17.0,
            sigma_space: 17.0,
        }
    }
}

/// Cutoffs for the validity mask.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// Pixels strictly brighter than this are mount/background.
    pub background_level: u8,
    /// Pixels strictly darker than this are unexposed film stock.
    pub unexposed_level: u8,
    /// Structuring element size used to grow the background region.
    pub background_margin: u32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            background_level: 240,
            unexposed_level: 20,
            background_margin: 5,
        }
    }
}

/// Whether the aggregated result keeps its rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    AxisAligned,
    Oriented,
}

/// Empirical inward nudge applied to the axis-aligned crop box.
///
/// Compensates for the boundary growth introduced by the morphological close.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropInset {
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for CropInset {
    fn default() -> Self {
        Self {
            min_scale: 1.003,
            max_scale: 0.997,
        }
    }
}

/// Parameters of the exposure-bounds sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureBoundsParams {
    /// Per-dimension fraction of the image defining the "whole frame" area:
    /// `max_area = (f * W) * (f * H)`.
    pub area_fraction_max: f64,
    /// Fraction of `max_area` a candidate must reach to be accepted.
    pub area_fraction_min: f64,
    /// First (highest) threshold level of the sweep.
    pub start_level: u8,
    /// Amount the threshold drops between levels.
    pub threshold_step: u8,
    /// Structuring element size of the per-level morphological close.
    pub close_kernel_size: u32,
    pub smoothing: Smoothing,
    pub mask: MaskParams,
    pub output: OutputMode,
    pub inset: CropInset,
    /// Feed intermediate masks and per-level frames to the debug sink.
    pub debug: bool,
}

impl Default for ExposureBoundsParams {
    fn default() -> Self {
        Self {
            area_fraction_max: 0.92,
            area_fraction_min: 0.85,
            start_level: 240,
            threshold_step: 5,
            close_kernel_size: 10,
            smoothing: Smoothing::default(),
            mask: MaskParams::default(),
            output: OutputMode::AxisAligned,
            inset: CropInset::default(),
            debug: false,
        }
    }
}

impl ExposureBoundsParams {
    /// Looser preset used to outline the frame on the full scan.
    ///
    /// Accepts smaller candidates, grows the background margin and keeps the
    /// rectangle's rotation.
    pub fn for_annotation() -> Self {
        Self {
            area_fraction_max: 0.98,
            area_fraction_min: 0.65,
            mask: MaskParams {
                background_margin: 15,
                ..MaskParams::default()
            },
            output: OutputMode::Oriented,
            ..Self::default()
        }
    }

    /// Check every field before any scan starts.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let fraction_ok = |v: f64| v.is_finite() && v > 0.0 && v <= 1.0;
        if !fraction_ok(self.area_fraction_max) {
            return Err(ParamsError::AreaFractionOutOfRange {
                name: "area_fraction_max",
                value: self.area_fraction_max,
            });
        }
        if !fraction_ok(self.area_fraction_min) {
            return Err(ParamsError::AreaFractionOutOfRange {
                name: "area_fraction_min",
                value: self.area_fraction_min,
            });
        }
        if self.area_fraction_min > self.area_fraction_max {
            return Err(ParamsError::AreaFractionsInverted {
                min: self.area_fraction_min,
                max: self.area_fraction_max,
            });
        }
        if self.threshold_step == 0 {
            return Err(ParamsError::ZeroThresholdStep);
        }
        if self.start_level == 0 {
            return Err(ParamsError::ZeroStartLevel);
        }
        validate_kernel("close_kernel_size", self.close_kernel_size)?;
        validate_kernel("mask.background_margin", self.mask.background_margin)?;
        if self.mask.unexposed_level > self.mask.background_level {
            return Err(ParamsError::MaskLevelsInverted {
                unexposed: self.mask.unexposed_level,
                background: self.mask.background_level,
            });
        }
        match self.smoothing {
            Smoothing::None => {}
            Smoothing::Gaussian { sigma } => {
                if !(sigma.is_finite() && sigma > 0.0) {
                    return Err(ParamsError::InvalidSmoothing(
                        "gaussian sigma must be positive",
                    ));
                }
            }
            Smoothing::Bilateral {
                diameter,
                sigma_color,
                sigma_space,
            } => {
                if diameter == 0 || diameter > MAX_KERNEL_SIZE {
                    return Err(ParamsError::InvalidSmoothing(
                        "bilateral diameter must be in 1..=255",
                    ));
                }
                if !(sigma_color.is_finite() && sigma_color > 0.0)
                    || !(sigma_space.is_finite() && sigma_space > 0.0)
                {
                    return Err(ParamsError::InvalidSmoothing(
                        "bilateral sigmas must be positive",
                    ));
                }
            }
        }
        if !(self.inset.min_scale.is_finite() && self.inset.min_scale > 0.0)
            || !(self.inset.max_scale.is_finite() && self.inset.max_scale > 0.0)
        {
            return Err(ParamsError::InvalidInset);
        }
        Ok(())
    }

    /// `max_area` and `min_capture_area` for a `width`×`height` image.
    pub fn area_limits(&self, width: usize, height: usize) -> (f64, f64) {
        let max_area =
            (width as f64 * self.area_fraction_max) * (height as f64 * self.area_fraction_max);
        (max_area, max_area * self.area_fraction_min)
    }
}

/// Largest structuring element the morphology binding accepts.
pub const MAX_KERNEL_SIZE: u32 = 255;

fn validate_kernel(name: &'static str, size: u32) -> Result<(), ParamsError> {
    if size == 0 || size > MAX_KERNEL_SIZE {
        return Err(ParamsError::KernelSizeOutOfRange { name, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        ExposureBoundsParams::default().validate().expect("default");
        ExposureBoundsParams::for_annotation()
            .validate()
            .expect("annotation preset");
    }

    #[test]
    fn area_limits_follow_fractions() {
        let params = ExposureBoundsParams::default();
        let (max_area, min_area) = params.area_limits(1000, 500);
        assert_relative_eq!(max_area, 920.0 * 460.0, epsilon = 1e-6);
        assert_relative_eq!(min_area, 920.0 * 460.0 * 0.85, epsilon = 1e-6);
    }

    #[test]
    fn inverted_fractions_fail_fast() {
        let params = ExposureBoundsParams {
            area_fraction_min: 0.95,
            area_fraction_max: 0.9,
            ..ExposureBoundsParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::AreaFractionsInverted { .. })
        ));
    }

    #[test]
    fn zero_kernel_and_step_are_rejected() {
        let params = ExposureBoundsParams {
            close_kernel_size: 0,
            ..ExposureBoundsParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::KernelSizeOutOfRange { size: 0, .. })
        ));

        let params = ExposureBoundsParams {
            threshold_step: 0,
            ..ExposureBoundsParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::ZeroThresholdStep)
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let params: ExposureBoundsParams = serde_json::from_str(
            r#"{ "area_fraction_min": 0.7, "smoothing": { "kind": "gaussian", "sigma": 1.5 } }"#,
        )
        .expect("parse");
        assert_relative_eq!(params.area_fraction_min, 0.7);
        assert_relative_eq!(params.area_fraction_max, 0.92);
        assert_eq!(params.smoothing, Smoothing::Gaussian { sigma: 1.5 });
        assert_eq!(params.mask, MaskParams::default());
    }

    #[test]
    fn negative_kernel_in_json_is_rejected() {
        let parsed: Result<ExposureBoundsParams, _> =
            serde_json::from_str(r#"{ "close_kernel_size": -3 }"#);
        assert!(parsed.is_err());
    }
}

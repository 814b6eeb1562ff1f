/// Parameter validation failures, reported before any scan starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{name} must lie in (0, 1] (got {value})")]
    AreaFractionOutOfRange { name: &'static str, value: f64 },
    #[error("area_fraction_min ({min}) exceeds area_fraction_max ({max})")]
    AreaFractionsInverted { min: f64, max: f64 },
    #[error("threshold_step must be positive")]
    ZeroThresholdStep,
    #[error("start_level must be positive")]
    ZeroStartLevel,
    #[error("{name} must lie in 1..=255 (got {size})")]
    KernelSizeOutOfRange { name: &'static str, size: u32 },
    #[error("unexposed level ({unexposed}) is above background level ({background})")]
    MaskLevelsInverted { unexposed: u8, background: u8 },
    #[error("invalid smoothing: {0}")]
    InvalidSmoothing(&'static str),
    #[error("crop inset scales must be positive")]
    InvalidInset,
}

/// Errors returned by the exposure-bounds detector.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    InvalidParams(#[from] ParamsError),

    #[error("image has no pixels (width={width}, height={height})")]
    EmptyImage { width: usize, height: usize },

    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("no candidate frame found after scanning {levels_scanned} threshold levels")]
    NoCandidates { levels_scanned: usize },
}

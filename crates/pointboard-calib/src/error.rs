use pointboard_core::DegenerateReason;

/// Errors returned by calibration capture.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("corner rejected: {0}")]
    Degenerate(#[from] DegenerateReason),
    #[error("calibration already has all four corners")]
    AlreadyComplete,
    #[error("a calibration set holds at most four corners (got {got})")]
    TooManyCorners { got: usize },
}

/// Errors returned by coordinate mapping.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    #[error("calibration incomplete ({captured} of 4 corners)")]
    Incomplete { captured: usize },
    #[error("degenerate calibration: {0}")]
    Degenerate(#[from] DegenerateReason),
}

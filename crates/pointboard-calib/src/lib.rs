//! Board calibration and coordinate mapping.
//!
//! - [`CalibrationSession`]: collects the four board corners (top-left,
//!   top-right, bottom-left, bottom-right) from live detections and rejects
//!   degenerate sets as soon as a corner makes them degenerate.
//! - [`CoordinateMapper`]: maps a detected point into the board's own
//!   normalized frame by inverting the bilinear (or projective) transform of
//!   the calibrated quadrilateral.

mod calibration;
mod error;
mod mapper;
mod session;

pub use calibration::{CalibrationPoint, CalibrationSet, Corner};
pub use error::{CalibrationError, MapError};
pub use mapper::{locate, BoardLocation, CoordinateMapper, Located, MapperParams, MappingModel};
pub use session::{CalibrationSession, CaptureOutcome, SessionState};

pub use pointboard_core::{BoardQuad, DegenerateReason};

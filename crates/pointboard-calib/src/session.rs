use pointboard_core::{check_partial_corners, BoardQuad};
use pointboard_detect::DetectedPoint;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::calibration::{CalibrationPoint, CalibrationSet, Corner};
use crate::error::CalibrationError;

/// Progress of a calibration session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "captured", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    /// `1..=3` corners captured.
    Collecting(usize),
    Ready,
}

impl SessionState {
    fn from_captured(n: usize) -> Self {
        match n {
            0 => SessionState::Idle,
            1..=3 => SessionState::Collecting(n),
            _ => SessionState::Ready,
        }
    }

    pub fn captured(self) -> usize {
        match self {
            SessionState::Idle => 0,
            SessionState::Collecting(n) => n,
            SessionState::Ready => 4,
        }
    }
}

/// Result of a capture command that did not fail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CaptureOutcome {
    /// No point was detected; nothing changed, retry once the light is visible.
    NothingToCapture,
    Captured { corner: Corner, state: SessionState },
}

/// Calibration state machine: `Idle -> Collecting(1..=3) -> Ready`.
///
/// Corners are always appended in [`Corner::ALL`] order; prompting the user
/// for the right corner is the caller's job.
#[derive(Clone, Debug, Default)]
pub struct CalibrationSession {
    set: CalibrationSet,
    quad: Option<BoardQuad>,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_captured(self.set.len())
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.quad.is_some()
    }

    /// The corner the next capture fills.
    pub fn next_corner(&self) -> Option<Corner> {
        self.set.next_corner()
    }

    pub fn calibration(&self) -> &CalibrationSet {
        &self.set
    }

    /// The validated board quad once `Ready`.
    pub fn quad(&self) -> Option<&BoardQuad> {
        self.quad.as_ref()
    }

    /// Capture the next corner from the current detection.
    ///
    /// A corner that would make the set degenerate is rejected and the state
    /// is left unchanged.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, point), fields(captured = self.set.len()))
    )]
    pub fn capture_corner(
        &mut self,
        point: Option<&DetectedPoint>,
    ) -> Result<CaptureOutcome, CalibrationError> {
        let Some(corner) = self.set.next_corner() else {
            return Err(CalibrationError::AlreadyComplete);
        };
        let Some(point) = point else {
            log::debug!("capture of {corner} corner skipped: no point detected");
            return Ok(CaptureOutcome::NothingToCapture);
        };

        let mut candidate = self.set.as_points();
        candidate.push(nalgebra::Point2::new(point.norm_x, point.norm_y));
        if let Err(reason) = check_partial_corners(&candidate) {
            log::warn!(
                "{corner} corner at ({:.3}, {:.3}) rejected: {reason}",
                point.norm_x,
                point.norm_y
            );
            return Err(reason.into());
        }
        if let [tl, tr, bl, br] = candidate[..] {
            self.quad = Some(BoardQuad::new(tl, tr, bl, br)?);
        }

        self.set.push(CalibrationPoint::new(point.norm_x, point.norm_y));
        let state = self.state();
        log::info!(
            "captured {corner} corner at ({:.3}, {:.3}), {}/4",
            point.norm_x,
            point.norm_y,
            state.captured()
        );
        Ok(CaptureOutcome::Captured { corner, state })
    }

    /// Clear all corners and return to `Idle`.
    pub fn reset(&mut self) {
        if !self.set.is_empty() {
            log::info!("calibration reset ({} corners dropped)", self.set.len());
        }
        self.set.clear();
        self.quad = None;
    }

    /// Replace the session content with a previously saved set.
    ///
    /// The set is validated like a sequence of captures; on error the
    /// session is left untouched.
    pub fn restore(&mut self, set: CalibrationSet) -> Result<SessionState, CalibrationError> {
        let points = set.as_points();
        check_partial_corners(&points)?;
        let quad = match set.corners() {
            Some(corners) => Some(BoardQuad::from_corners(corners)?),
            None => None,
        };
        self.set = set;
        self.quad = quad;
        Ok(self.state())
    }
}

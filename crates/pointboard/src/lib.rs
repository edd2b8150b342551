//! High-level facade for the `pointboard-*` workspace.
//!
//! A user points a laser or LED at a printed communication board; a camera
//! watches the board. This crate ties the pieces together:
//!
//! - [`TrackingLoop`]: owns the video source and the calibration session,
//!   and runs detection + mapping once per [`TrackingLoop::tick`].
//! - [`VideoSource`]: the frame provider the loop pulls from.
//! - [`layout`]: resolves normalized board coordinates to grid cells.
//! - [`io`]: JSON configuration and calibration persistence.
//! - [`detect`] (feature `image`): adapters from `image` buffers and an
//!   image-file video source.
//!
//! ## Quickstart
//!
//! ```
//! use pointboard::{FrameSequence, TrackingLoop, TrackerConfig};
//! use pointboard::core::{Frame, PixelLayout};
//!
//! let mut frames = Vec::new();
//! for (x, y) in [(10, 10), (190, 10), (10, 190), (190, 190), (100, 100)] {
//!     let mut frame = Frame::filled(200, 200, PixelLayout::Rgba, [90, 90, 90]);
//!     frame.fill_square(x, y, 7, [255, 20, 20]);
//!     frames.push(frame);
//! }
//!
//! let mut tracker = TrackingLoop::new(&TrackerConfig::default());
//! tracker.start(FrameSequence::new(frames));
//! for _ in 0..4 {
//!     tracker.tick().unwrap();
//!     tracker.capture_corner().unwrap();
//! }
//! let tick = tracker.tick().unwrap();
//! let loc = tick.location.and_then(|l| l.on_board().copied()).unwrap();
//! assert!((loc.u - 0.5).abs() < 0.02 && (loc.v - 0.5).abs() < 0.02);
//! ```

pub mod io;
pub mod layout;
mod source;
mod tracking;

#[cfg(feature = "image")]
pub mod detect;

pub use pointboard_calib as calib;
pub use pointboard_core as core;
pub use pointboard_detect as detection;

pub use io::{CalibrationFile, IoError, TrackerConfig};
pub use layout::{BoardLayout, Cell, GridLayout, LayoutError};
pub use source::{FrameSequence, VideoSource, VideoSourceError};
pub use tracking::{TickResult, TrackingError, TrackingLoop};

pub use pointboard_calib::{
    BoardLocation, CalibrationError, CalibrationSet, CaptureOutcome, Corner, Located,
    SessionState,
};
pub use pointboard_detect::{DetectedPoint, DetectorParams};

//! Core types and utilities for point-light board tracking.
//!
//! This crate is intentionally small: pixel frame views, the board
//! quadrilateral geometry (non-degeneracy checks, forward and inverse
//! bilinear maps), a 4-point homography and the logger. It does *not*
//! depend on any camera backend or image decoding crate.

mod frame;
mod homography;
mod logger;
mod quad;

pub use frame::{Frame, FrameError, FrameView, PixelLayout};
pub use homography::{homography_from_4pt, Homography};
pub use quad::{
    check_partial_corners, BoardQuad, DegenerateReason, MIN_EDGE, MIN_TURN_SINE,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

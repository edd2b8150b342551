//! Point-light detection on raw video frames.
//!
//! The detector samples a frame on a fixed stride, classifies samples whose
//! target channel is bright and dominates the other two channels, and
//! reduces the classified samples to their centroid. Clusters smaller than
//! `min_cluster` samples are treated as noise.

mod analyzer;
mod params;
mod point;

pub use analyzer::{analyze_frame, FrameAnalyzer};
pub use params::{ColorChannel, ColorThreshold, DetectorParams, SamplePattern};
pub use point::DetectedPoint;

use serde::{Deserialize, Serialize};

/// Centroid of the classified samples of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedPoint {
    /// Pixel coordinates in the source frame.
    pub x: f64,
    pub y: f64,
    /// `x / width`, in `[0, 1]`.
    pub norm_x: f64,
    /// `y / height`, in `[0, 1]`.
    pub norm_y: f64,
    /// Number of classified samples behind the centroid.
    pub support: usize,
}

impl DetectedPoint {
    pub fn new(x: f64, y: f64, width: usize, height: usize, support: usize) -> Self {
        Self {
            x,
            y,
            norm_x: x / width as f64,
            norm_y: y / height as f64,
            support,
        }
    }

    /// Normalized position as `(x, y)`.
    #[inline]
    pub fn normalized(&self) -> (f64, f64) {
        (self.norm_x, self.norm_y)
    }
}

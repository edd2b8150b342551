use serde::{Deserialize, Serialize};

/// Colour channel the light source saturates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorChannel {
    #[default]
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ColorChannel::Red => 0,
            ColorChannel::Green => 1,
            ColorChannel::Blue => 2,
        }
    }
}

/// Saturation / dominance test for one pixel.
///
/// A pixel is classified as target colour when its target channel is
/// strictly above `min_brightness` and strictly above `dominance` times each
/// of the other two channels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThreshold {
    pub channel: ColorChannel,
    pub min_brightness: u8,
    pub dominance: f32,
}

impl Default for ColorThreshold {
    fn default() -> Self {
        Self {
            channel: ColorChannel::Red,
            min_brightness: 150,
            dominance: 1.6,
        }
    }
}

impl ColorThreshold {
    #[inline]
    pub fn matches(&self, rgb: [u8; 3]) -> bool {
        let c = self.channel.index();
        let target = rgb[c];
        if target <= self.min_brightness {
            return false;
        }
        let t = target as f32;
        (0..3)
            .filter(|&k| k != c)
            .all(|k| t > self.dominance * rgb[k] as f32)
    }
}

/// Which pixels are visited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePattern {
    /// Pixels with `(x + y) % stride == 0`: every `stride`-th column, with
    /// the phase shifted by one per row. Any `stride x stride` window holds
    /// exactly `stride` samples wherever it sits, independent of frame width.
    #[default]
    Staggered,
    /// Every `stride`-th pixel in both axes, about `1 / stride^2` of the frame.
    Grid,
}

/// Parameters of the point-light detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub threshold: ColorThreshold,
    /// Sampling stride in pixels, clamped to at least 1.
    pub stride: usize,
    pub pattern: SamplePattern,
    /// Minimal number of classified samples for a detection.
    pub min_cluster: usize,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            threshold: ColorThreshold::default(),
            stride: 3,
            pattern: SamplePattern::Staggered,
            min_cluster: 8,
        }
    }
}

use pointboard_core::FrameView;

use crate::params::{DetectorParams, SamplePattern};
use crate::point::DetectedPoint;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Stateless colour-blob detector.
#[derive(Clone, Debug, Default)]
pub struct FrameAnalyzer {
    params: DetectorParams,
}

#[derive(Default)]
struct Centroid {
    sum_x: u64,
    sum_y: u64,
    count: usize,
}

impl Centroid {
    #[inline]
    fn push(&mut self, x: usize, y: usize) {
        self.sum_x += x as u64;
        self.sum_y += y as u64;
        self.count += 1;
    }
}

impl FrameAnalyzer {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Reduce a frame to the centroid of its target-colour samples.
    ///
    /// Returns `None` when fewer than `min_cluster` samples are classified.
    /// Frames must have non-zero dimensions.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn analyze(&self, frame: &FrameView<'_>) -> Option<DetectedPoint> {
        debug_assert!(
            frame.width > 0 && frame.height > 0,
            "analyze called with an empty {}x{} frame",
            frame.width,
            frame.height
        );
        if frame.width == 0 || frame.height == 0 {
            return None;
        }

        let stride = self.params.stride.max(1);
        let threshold = &self.params.threshold;
        let mut acc = Centroid::default();

        match self.params.pattern {
            SamplePattern::Staggered => {
                for y in 0..frame.height {
                    let phase = (stride - y % stride) % stride;
                    for x in (phase..frame.width).step_by(stride) {
                        if threshold.matches(frame.rgb(x, y)) {
                            acc.push(x, y);
                        }
                    }
                }
            }
            SamplePattern::Grid => {
                for y in (0..frame.height).step_by(stride) {
                    for x in (0..frame.width).step_by(stride) {
                        if threshold.matches(frame.rgb(x, y)) {
                            acc.push(x, y);
                        }
                    }
                }
            }
        }

        if acc.count < self.params.min_cluster.max(1) {
            log::trace!(
                "no detection: {} samples below cluster size {}",
                acc.count,
                self.params.min_cluster
            );
            return None;
        }

        let n = acc.count as f64;
        let point = DetectedPoint::new(
            acc.sum_x as f64 / n,
            acc.sum_y as f64 / n,
            frame.width,
            frame.height,
            acc.count,
        );
        log::debug!(
            "point at ({:.1}, {:.1}) from {} samples",
            point.x,
            point.y,
            point.support
        );
        Some(point)
    }
}

/// Convenience wrapper around [`FrameAnalyzer::analyze`].
pub fn analyze_frame(frame: &FrameView<'_>, params: &DetectorParams) -> Option<DetectedPoint> {
    FrameAnalyzer::new(params.clone()).analyze(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ColorChannel, ColorThreshold};
    use approx::assert_abs_diff_eq;
    use pointboard_core::{Frame, PixelLayout};

    const GRAY: [u8; 3] = [128, 128, 128];
    const RED: [u8; 3] = [255, 20, 20];

    #[test]
    fn finds_small_patch_centroid() {
        let mut frame = Frame::filled(320, 240, PixelLayout::Rgba, GRAY);
        frame.fill_square(100, 100, 5, RED);

        let p = FrameAnalyzer::default()
            .analyze(&frame.view())
            .expect("patch detected");
        assert_abs_diff_eq!(p.x, 100.0, epsilon = 0.5);
        assert_abs_diff_eq!(p.y, 100.0, epsilon = 0.5);
        assert_abs_diff_eq!(p.norm_x, p.x / 320.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.norm_y, p.y / 240.0, epsilon = 1e-12);
        assert!(p.support >= 8);
    }

    #[test]
    fn neutral_frame_has_no_detection() {
        let frame = Frame::filled(64, 48, PixelLayout::Rgba, GRAY);
        assert!(FrameAnalyzer::default().analyze(&frame.view()).is_none());
    }

    #[test]
    fn cluster_gate_boundary_is_exact() {
        let params = DetectorParams::default();
        let width = 64;
        // row 0 samples every stride-th column
        let sampled = |k: usize| (k * params.stride, 0);

        let mut frame = Frame::filled(width, 8, PixelLayout::Rgba, GRAY);
        for k in 0..params.min_cluster - 1 {
            let (x, y) = sampled(k);
            frame.set_rgb(x, y, RED);
        }
        // never sampled
        frame.set_rgb(1, 0, RED);
        frame.set_rgb(2, 0, RED);
        assert!(FrameAnalyzer::new(params.clone()).analyze(&frame.view()).is_none());

        let (x, y) = sampled(params.min_cluster - 1);
        frame.set_rgb(x, y, RED);
        let p = FrameAnalyzer::new(params.clone())
            .analyze(&frame.view())
            .expect("cluster at threshold");
        assert_eq!(p.support, params.min_cluster);
        let mean_x = (0..params.min_cluster).map(|k| sampled(k).0).sum::<usize>() as f64
            / params.min_cluster as f64;
        assert_abs_diff_eq!(p.x, mean_x, epsilon = 1e-12);
    }

    #[test]
    fn small_patch_found_at_every_phase_and_width() {
        for width in [1920, 300, 320, 641] {
            for (cx, cy) in [(99, 100), (100, 100), (101, 100), (100, 101), (101, 102)] {
                let mut frame = Frame::filled(width, 240, PixelLayout::Rgba, GRAY);
                frame.fill_square(cx, cy, 5, RED);
                let p = FrameAnalyzer::default()
                    .analyze(&frame.view())
                    .unwrap_or_else(|| panic!("5x5 patch at ({cx}, {cy}) lost in {width}-wide frame"));
                assert!((8..=9).contains(&p.support), "support {}", p.support);
                assert_abs_diff_eq!(p.x, cx as f64, epsilon = 0.5);
                assert_abs_diff_eq!(p.y, cy as f64, epsilon = 0.5);
            }
        }
    }

    #[test]
    fn grid_pattern_is_sparser() {
        let mut frame = Frame::filled(320, 240, PixelLayout::Rgb, GRAY);
        frame.fill_square(100, 100, 5, RED);

        let grid = DetectorParams {
            pattern: SamplePattern::Grid,
            ..DetectorParams::default()
        };
        assert!(analyze_frame(&frame.view(), &grid).is_none());

        let relaxed = DetectorParams {
            min_cluster: 4,
            ..grid
        };
        let p = analyze_frame(&frame.view(), &relaxed).expect("relaxed gate");
        assert_eq!(p.support, 4);
        assert_abs_diff_eq!(p.x, 100.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 100.5, epsilon = 1e-12);
    }

    #[test]
    fn green_light_with_rgb_layout() {
        let mut frame = Frame::filled(90, 60, PixelLayout::Rgb, GRAY);
        frame.fill_square(30, 20, 7, [30, 250, 40]);
        frame.fill_square(70, 40, 7, RED);

        let params = DetectorParams {
            threshold: ColorThreshold {
                channel: ColorChannel::Green,
                ..ColorThreshold::default()
            },
            ..DetectorParams::default()
        };
        let p = analyze_frame(&frame.view(), &params).expect("green patch");
        assert_abs_diff_eq!(p.x, 30.0, epsilon = 1.0);
        assert_abs_diff_eq!(p.y, 20.0, epsilon = 1.0);
    }

    #[test]
    fn output_is_deterministic() {
        let mut frame = Frame::filled(200, 100, PixelLayout::Rgba, GRAY);
        frame.fill_square(50, 60, 9, RED);
        let analyzer = FrameAnalyzer::default();
        assert_eq!(analyzer.analyze(&frame.view()), analyzer.analyze(&frame.view()));
    }
}

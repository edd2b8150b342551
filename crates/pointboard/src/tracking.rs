use pointboard_calib::{
    CalibrationError, CalibrationSession, CalibrationSet, CaptureOutcome, CoordinateMapper,
    Located, MapperParams, SessionState,
};
use pointboard_core::FrameView;
use pointboard_detect::{DetectedPoint, FrameAnalyzer};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::io::TrackerConfig;
use crate::source::{VideoSource, VideoSourceError};

#[derive(thiserror::Error, Debug)]
pub enum TrackingError {
    #[error("tracking stopped: {0}")]
    VideoSourceUnavailable(#[source] VideoSourceError),
}

/// What one tick observed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub point: Option<DetectedPoint>,
    pub state: SessionState,
    /// Present only when calibrated and a point was detected.
    pub location: Option<Located>,
}

/// Per-tick state that does not touch the video source.
#[derive(Debug)]
struct Pipeline {
    analyzer: FrameAnalyzer,
    mapper_params: MapperParams,
    session: CalibrationSession,
    mapper: Option<CoordinateMapper>,
    point: Option<DetectedPoint>,
    location: Option<Located>,
}

impl Pipeline {
    fn process(&mut self, frame: Option<&FrameView<'_>>) -> TickResult {
        self.point = frame.and_then(|f| self.analyzer.analyze(f));
        self.location = match (&self.mapper, &self.point) {
            (Some(mapper), Some(point)) => Some(mapper.locate(point)),
            _ => None,
        };
        if let Some(loc) = &self.location {
            log::debug!("point mapped: {loc:?}");
        }
        self.result()
    }

    fn result(&self) -> TickResult {
        TickResult {
            point: self.point,
            state: self.session.state(),
            location: self.location,
        }
    }

    fn clear_observation(&mut self) {
        self.point = None;
        self.location = None;
    }

    /// Rebuild the mapper after the session changed.
    fn sync_mapper(&mut self) {
        self.mapper = match self.session.quad() {
            Some(quad) => match CoordinateMapper::new(*quad, self.mapper_params.clone()) {
                Ok(mapper) => Some(mapper),
                Err(err) => {
                    log::error!("calibration is ready but cannot be mapped: {err}");
                    None
                }
            },
            None => None,
        };
    }
}

/// Drives detection and mapping for one video source.
///
/// Every command takes `&mut self`, so a capture or reset always runs
/// between two ticks and never observes a half-processed frame.
#[derive(Debug)]
pub struct TrackingLoop<S> {
    pipeline: Pipeline,
    source: Option<S>,
}

impl<S: VideoSource> TrackingLoop<S> {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            pipeline: Pipeline {
                analyzer: FrameAnalyzer::new(config.detector.clone()),
                mapper_params: config.mapper.clone(),
                session: CalibrationSession::new(),
                mapper: None,
                point: None,
                location: None,
            },
            source: None,
        }
    }

    /// Attach a source and become active. A previously attached source is
    /// handed back.
    pub fn start(&mut self, source: S) -> Option<S> {
        log::info!("tracking started");
        self.pipeline.clear_observation();
        self.source.replace(source)
    }

    /// Release the source. Calibration is kept.
    pub fn stop(&mut self) -> Option<S> {
        self.pipeline.clear_observation();
        let source = self.source.take();
        if source.is_some() {
            log::info!("tracking stopped");
        }
        source
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Pull one frame from the source and process it.
    ///
    /// An inactive loop idles: the result carries no point. A failing source
    /// stops the loop and is dropped; the calibration survives.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn tick(&mut self) -> Result<TickResult, TrackingError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(self.pipeline.result());
        };
        match source.current_frame() {
            Ok(frame) => Ok(self.pipeline.process(frame.as_ref())),
            Err(err) => {
                log::warn!("video source failed, stopping: {err}");
                self.stop();
                Err(TrackingError::VideoSourceUnavailable(err))
            }
        }
    }

    /// Run the per-tick pipeline on a frame supplied by the caller.
    pub fn process_frame(&mut self, frame: &FrameView<'_>) -> TickResult {
        self.pipeline.process(Some(frame))
    }

    /// Capture the next board corner from the latest detected point.
    pub fn capture_corner(&mut self) -> Result<CaptureOutcome, CalibrationError> {
        let outcome = self
            .pipeline
            .session
            .capture_corner(self.pipeline.point.as_ref())?;
        if matches!(
            outcome,
            CaptureOutcome::Captured {
                state: SessionState::Ready,
                ..
            }
        ) {
            self.pipeline.sync_mapper();
        }
        Ok(outcome)
    }

    pub fn reset_calibration(&mut self) {
        self.pipeline.session.reset();
        self.pipeline.mapper = None;
        self.pipeline.location = None;
    }

    /// Load a saved calibration, replacing the current one on success.
    pub fn restore_calibration(
        &mut self,
        set: CalibrationSet,
    ) -> Result<SessionState, CalibrationError> {
        let state = self.pipeline.session.restore(set)?;
        self.pipeline.sync_mapper();
        self.pipeline.location = None;
        Ok(state)
    }

    pub fn session(&self) -> &CalibrationSession {
        &self.pipeline.session
    }

    /// Point detected by the last tick.
    pub fn latest_point(&self) -> Option<&DetectedPoint> {
        self.pipeline.point.as_ref()
    }

    pub fn latest_location(&self) -> Option<&Located> {
        self.pipeline.location.as_ref()
    }

    pub fn mapper(&self) -> Option<&CoordinateMapper> {
        self.pipeline.mapper.as_ref()
    }
}

use pointboard_core::{Frame, FrameView};

/// Errors reported by a [`VideoSource`].
#[derive(thiserror::Error, Debug)]
pub enum VideoSourceError {
    #[error("video source unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "image")]
    #[error("failed to decode frame {}", path.display())]
    Decode {
        path: std::path::PathBuf,
        #[source]
        source: ::image::ImageError,
    },
}

/// Provider of the frame to analyze on each tick.
///
/// The returned view borrows the source and is only valid for the tick that
/// requested it.
pub trait VideoSource {
    /// `Ok(None)` when no frame is available yet; `Err` when the source is
    /// gone for good.
    fn current_frame(&mut self) -> Result<Option<FrameView<'_>>, VideoSourceError>;
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn current_frame(&mut self) -> Result<Option<FrameView<'_>>, VideoSourceError> {
        (**self).current_frame()
    }
}

/// In-memory frames played once, one per call.
///
/// Reports the source as unavailable once every frame has been served.
#[derive(Clone, Debug, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    next: usize,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, next: 0 }
    }

    /// Frames not served yet.
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.next
    }
}

impl VideoSource for FrameSequence {
    fn current_frame(&mut self) -> Result<Option<FrameView<'_>>, VideoSourceError> {
        let Some(frame) = self.frames.get(self.next) else {
            return Err(VideoSourceError::Unavailable(format!(
                "frame sequence exhausted after {} frames",
                self.frames.len()
            )));
        };
        self.next += 1;
        Ok(Some(frame.view()))
    }
}

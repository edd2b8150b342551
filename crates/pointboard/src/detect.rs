//! Adapters between the `image` crate and the frame types.

use pointboard_core::{FrameView, PixelLayout};
use pointboard_detect::{analyze_frame, DetectedPoint, DetectorParams};
use std::path::{Path, PathBuf};

use crate::source::{VideoSource, VideoSourceError};

/// Borrow an `image::RgbaImage` as a frame.
pub fn rgba_view(img: &::image::RgbaImage) -> FrameView<'_> {
    FrameView {
        width: img.width() as usize,
        height: img.height() as usize,
        layout: PixelLayout::Rgba,
        data: img.as_raw(),
    }
}

/// Borrow an `image::RgbImage` as a frame.
pub fn rgb_view(img: &::image::RgbImage) -> FrameView<'_> {
    FrameView {
        width: img.width() as usize,
        height: img.height() as usize,
        layout: PixelLayout::Rgb,
        data: img.as_raw(),
    }
}

/// Detect the light in any decoded image. 8-bit RGB(A) buffers are used in
/// place; everything else is converted to RGBA first.
pub fn analyze_image(img: &::image::DynamicImage, params: &DetectorParams) -> Option<DetectedPoint> {
    match img {
        ::image::DynamicImage::ImageRgba8(rgba) => analyze_frame(&rgba_view(rgba), params),
        ::image::DynamicImage::ImageRgb8(rgb) => analyze_frame(&rgb_view(rgb), params),
        other => analyze_frame(&rgba_view(&other.to_rgba8()), params),
    }
}

/// Decode an image file into RGBA.
pub fn load_rgba(path: impl AsRef<Path>) -> Result<::image::RgbaImage, VideoSourceError> {
    let path = path.as_ref();
    ::image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| VideoSourceError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Plays a list of image files as consecutive frames.
///
/// Each call decodes the next file; once the list is exhausted the source
/// reports itself unavailable.
#[derive(Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    current: Option<::image::RgbaImage>,
}

impl ImageSequenceSource {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            next: 0,
            current: None,
        }
    }

    /// File behind the most recently served frame.
    pub fn current_path(&self) -> Option<&Path> {
        self.next
            .checked_sub(1)
            .and_then(|i| self.paths.get(i))
            .map(PathBuf::as_path)
    }

    pub fn remaining(&self) -> usize {
        self.paths.len() - self.next
    }
}

impl VideoSource for ImageSequenceSource {
    fn current_frame(&mut self) -> Result<Option<FrameView<'_>>, VideoSourceError> {
        let Some(path) = self.paths.get(self.next) else {
            return Err(VideoSourceError::Unavailable(format!(
                "image sequence exhausted after {} frames",
                self.paths.len()
            )));
        };
        log::debug!("decoding frame {}", path.display());
        let img = load_rgba(path)?;
        self.next += 1;
        let img = self.current.insert(img);
        Ok(Some(rgba_view(img)))
    }
}

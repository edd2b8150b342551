use serde::{Deserialize, Serialize};

/// Channel order of a packed 8-bit pixel buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    #[default]
    Rgba,
    Rgb,
}

impl PixelLayout {
    /// Bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgba => 4,
            PixelLayout::Rgb => 3,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid frame buffer length (expected {expected} bytes, got {got})")]
    BufferLength { expected: usize, got: usize },
}

/// Borrowed view of one video frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    pub width: usize,
    pub height: usize,
    pub layout: PixelLayout,
    pub data: &'a [u8], // row-major, len = w*h*channels
}

impl<'a> FrameView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        layout: PixelLayout,
        data: &'a [u8],
    ) -> Result<Self, FrameError> {
        let expected = width * height * layout.channels();
        if data.len() != expected {
            return Err(FrameError::BufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// `[r, g, b]` of the pixel with flat raster index `idx`.
    #[inline]
    pub fn rgb_at_index(&self, idx: usize) -> [u8; 3] {
        let o = idx * self.layout.channels();
        [self.data[o], self.data[o + 1], self.data[o + 2]]
    }

    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        self.rgb_at_index(y * self.width + x)
    }
}

/// Owned frame buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
}

impl Frame {
    /// A frame filled with a single colour (alpha 255 for RGBA).
    pub fn filled(width: usize, height: usize, layout: PixelLayout, rgb: [u8; 3]) -> Self {
        let rgba = [rgb[0], rgb[1], rgb[2], 255];
        let px = &rgba[..layout.channels()];
        Self {
            width,
            height,
            layout,
            data: px.repeat(width * height),
        }
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data: &self.data,
        }
    }

    /// Overwrite the colour channels of one pixel. Out-of-bounds writes are ignored.
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let o = (y * self.width + x) * self.layout.channels();
        self.data[o..o + 3].copy_from_slice(&rgb);
    }

    /// Paint an axis-aligned square of side `size` centred on `(cx, cy)`.
    ///
    /// For odd sizes the square covers `cx - size/2 ..= cx + size/2`.
    pub fn fill_square(&mut self, cx: usize, cy: usize, size: usize, rgb: [u8; 3]) {
        let half = size / 2;
        let x0 = cx.saturating_sub(half);
        let y0 = cy.saturating_sub(half);
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                self.set_rgb(x, y, rgb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_rejects_wrong_buffer_length() {
        let data = vec![0u8; 10];
        let err = FrameView::new(2, 2, PixelLayout::Rgb, &data).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferLength {
                expected: 12,
                got: 10
            }
        );
    }

    #[test]
    fn rgb_reads_respect_layout() {
        let mut rgba = Frame::filled(4, 3, PixelLayout::Rgba, [1, 2, 3]);
        rgba.set_rgb(2, 1, [200, 10, 20]);
        assert_eq!(rgba.view().rgb(2, 1), [200, 10, 20]);
        assert_eq!(rgba.view().rgb(0, 0), [1, 2, 3]);
        assert_eq!(rgba.data[(4 + 2) * 4 + 3], 255);

        let mut rgb = Frame::filled(4, 3, PixelLayout::Rgb, [1, 2, 3]);
        rgb.set_rgb(3, 2, [9, 8, 7]);
        assert_eq!(rgb.view().rgb(3, 2), [9, 8, 7]);
        assert_eq!(rgb.data.len(), 36);
    }

    #[test]
    fn fill_square_is_centred_and_clipped() {
        let mut f = Frame::filled(10, 10, PixelLayout::Rgb, [0, 0, 0]);
        f.fill_square(5, 5, 3, [255, 0, 0]);
        let red: Vec<(usize, usize)> = (0..10)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| f.view().rgb(x, y) == [255, 0, 0])
            .collect();
        assert_eq!(red.len(), 9);
        assert!(red.contains(&(4, 4)) && red.contains(&(6, 6)));

        f.fill_square(9, 9, 5, [0, 255, 0]);
        assert_eq!(f.view().rgb(9, 9), [0, 255, 0]);
    }
}

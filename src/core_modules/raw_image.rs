// THEORY:
// `RawImageBuffer` is the hand-off point between the drawing surface and the
// preprocessor. The surface owns the bytes; the core only borrows them for the
// duration of one classification, so the type is a validated view rather than
// an owned copy. Validation happens once, at construction: after that every
// stage may index the buffer without re-checking its length.
//
// `OwnedImage` is the same thing with owned storage, for callers (the worker
// pool, file loading) that need to move an image across a task boundary.

use crate::core_modules::error::{PreconditionError, PreconditionResult};
use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};

/// Byte length of a `width × height` RGBA raster, or an error when it does
/// not fit in `usize`.
fn rgba_len(width: usize, height: usize) -> PreconditionResult<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(PreconditionError::DimensionsOverflow { width, height })
}

/// A borrowed RGBA raster, row-major with a top-left origin.
#[derive(Debug, Clone, Copy)]
pub struct RawImageBuffer<'a> {
    width: usize,
    height: usize,
    data: &'a [u8],
}

impl<'a> RawImageBuffer<'a> {
    /// Wraps `data` after checking it holds exactly `4 * width * height` bytes.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> PreconditionResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(PreconditionError::BufferLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The pixel at row `y`, column `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        let offset = CHANNELS * (y * self.width + x);
        Pixel::new(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        )
    }

    /// Iterates one row of pixels, left to right.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> impl Iterator<Item = Pixel> + 'a {
        let start = CHANNELS * y * self.width;
        let end = start + CHANNELS * self.width;
        let data: &'a [u8] = self.data;
        data[start..end]
            .chunks_exact(CHANNELS)
            .map(|px| Pixel::new(px[0], px[1], px[2], px[3]))
    }
}

/// An RGBA raster that owns its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl OwnedImage {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// A fully transparent canvas.
    pub fn blank(width: usize, height: usize) -> PreconditionResult<Self> {
        let len = rgba_len(width, height)?;
        Ok(Self::new(width, height, vec![0; len]))
    }

    /// Borrows the image as a validated `RawImageBuffer`.
    pub fn as_buffer(&self) -> PreconditionResult<RawImageBuffer<'_>> {
        RawImageBuffer::new(self.width, self.height, &self.data)
    }

    /// Paints an opaque pixel with the given gray level. Coordinates outside
    /// the canvas are ignored.
    pub fn paint(&mut self, x: usize, y: usize, gray: u8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = CHANNELS * (y * self.width + x);
        if let Some(px) = self.data.get_mut(offset..offset + CHANNELS) {
            px.copy_from_slice(&[gray, gray, gray, 255]);
        }
    }

    /// Paints an opaque axis-aligned rectangle, clipped to the canvas.
    pub fn paint_rect(&mut self, x0: usize, y0: usize, width: usize, height: usize, gray: u8) {
        for y in y0..y0.saturating_add(height).min(self.height) {
            for x in x0..x0.saturating_add(width).min(self.width) {
                self.paint(x, y, gray);
            }
        }
    }
}

// THEORY:
// The first preprocessing stage collapses the RGBA raster into a single
// intensity plane. The output keeps the canvas resolution; reducing it to the
// network's 28×28 grid is the job of the `grid_manager`.
//
// Polarity at this stage is "paper": background is 1.0 (white) and ink is
// darker. The inversion to "ink is positive" happens during downsampling.

use crate::core_modules::pixel::pixel::Intensity;
use crate::core_modules::raw_image::RawImageBuffer;

/// Owned `height × width` intensity plane in row-major layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleMatrix {
    pub width: usize,
    pub height: usize,
    pub data: Vec<Intensity>,
}

impl GrayscaleMatrix {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Intensity {
        self.data[y * self.width + x]
    }

    /// One row of intensities.
    #[inline]
    pub fn row(&self, y: usize) -> &[Intensity] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

/// Converts every pixel of `buffer` to its grayscale intensity.
pub fn to_grayscale(buffer: &RawImageBuffer<'_>) -> GrayscaleMatrix {
    let mut data = Vec::with_capacity(buffer.width() * buffer.height());
    for y in 0..buffer.height() {
        data.extend(buffer.row(y).map(|pixel| pixel.intensity()));
    }
    GrayscaleMatrix {
        width: buffer.width(),
        height: buffer.height(),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::raw_image::OwnedImage;

    #[test]
    fn blank_canvas_is_all_white() {
        let image = OwnedImage::blank(56, 56).unwrap();
        let gray = to_grayscale(&image.as_buffer().unwrap());
        assert_eq!(gray.data.len(), 56 * 56);
        assert!(gray.data.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn painted_pixels_use_red_over_255() {
        let mut image = OwnedImage::blank(4, 3).unwrap();
        image.paint(3, 2, 0);
        image.paint(0, 1, 102);
        let gray = to_grayscale(&image.as_buffer().unwrap());
        assert_eq!(gray.get(3, 2), 0.0);
        assert_eq!(gray.get(0, 1), 102.0 / 255.0);
        assert_eq!(gray.get(1, 1), 1.0);
        assert_eq!(gray.row(2).len(), 4);
    }

    #[test]
    fn only_red_channel_is_consulted() {
        let mut image = OwnedImage::blank(1, 1).unwrap();
        image.data.copy_from_slice(&[255, 0, 0, 255]);
        let gray = to_grayscale(&image.as_buffer().unwrap());
        assert_eq!(gray.get(0, 0), 1.0);
    }
}

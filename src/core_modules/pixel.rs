// THEORY:
// The `Pixel` module is the most fundamental unit of the preprocessor. It is a
// "dumb" data container for one RGBA quadruplet read out of the drawing
// surface's buffer, plus the single heuristic the pipeline needs from it: its
// grayscale intensity.
//
// The drawing surface only ever paints achromatic strokes onto a transparent
// background, so intensity is read from the red channel alone. A pixel the
// surface never touched (alpha exactly 0) is background and reads as white
// (1.0), regardless of whatever garbage its color channels hold.

pub mod pixel {
    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Intensity = f32;

    /// Number of bytes per pixel in the RGBA buffer.
    pub const CHANNELS: usize = 4;

    /// A single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        #[inline]
        pub fn is_transparent(&self) -> bool {
            self.alpha == 0
        }

        /// Grayscale intensity in [0, 1]: 1.0 for untouched background,
        /// `red / 255` for anything the surface painted.
        #[inline]
        pub fn intensity(&self) -> Intensity {
            if self.is_transparent() {
                1.0
            } else {
                self.red as Intensity / 255.0
            }
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for [Byte; CHANNELS] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn transparent_pixel_is_background() {
        // Color channels are ignored once alpha is zero.
        let pixel = Pixel::new(0, 12, 200, 0);
        assert_eq!(pixel.intensity(), 1.0);
    }

    #[test]
    fn opaque_pixel_reads_red_channel() {
        for red in [0u8, 1, 33, 128, 254, 255] {
            let pixel = Pixel::new(red, 255, 0, 255);
            assert_eq!(pixel.intensity(), red as f32 / 255.0);
        }
    }

    #[test]
    fn partially_transparent_pixel_is_not_background() {
        let pixel = Pixel::new(51, 51, 51, 1);
        assert_eq!(pixel.intensity(), 0.2);
    }

    #[test]
    fn byte_conversions_preserve_channel_order() {
        let pixel = Pixel::from([1, 2, 3, 4]);
        assert_eq!(pixel, Pixel::new(1, 2, 3, 4));
        let bytes: [u8; CHANNELS] = pixel.into();
        assert_eq!(bytes, [1, 2, 3, 4]);
    }
}

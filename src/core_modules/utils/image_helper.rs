pub mod image_helper {
    use crate::core_modules::grid_manager::{DigitGrid, GRID_SIZE};
    use crate::core_modules::raw_image::OwnedImage;
    use image::ImageEncoder;
    use std::path::Path;

    /// Decodes any image format the `image` crate understands into an RGBA
    /// canvas.
    pub fn load_rgba(path: &Path) -> Result<OwnedImage, image::error::ImageError> {
        let rgba = image::open(path)?.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(OwnedImage::new(
            width as usize,
            height as usize,
            rgba.into_raw(),
        ))
    }

    /// Writes an RGBA canvas to a PNG file.
    pub fn save_rgba(path: &Path, image: &OwnedImage) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(
            &image.data,
            image.width as u32,
            image.height as u32,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }

    /// Writes the 28×28 network input as an 8-bit grayscale PNG, with ink
    /// rendered dark on a white background.
    pub fn save_grid_png(path: &Path, grid: &DigitGrid) -> Result<(), image::error::ImageError> {
        let buffer: Vec<u8> = grid
            .cells
            .iter()
            .flatten()
            .map(|&ink| ((1.0 - ink.clamp(0.0, 1.0)) * 255.0).round() as u8)
            .collect();

        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(
            &buffer,
            GRID_SIZE as u32,
            GRID_SIZE as u32,
            image::ExtendedColorType::L8,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::image_helper::*;
    use crate::core_modules::grid_manager::DigitGrid;
    use crate::core_modules::raw_image::OwnedImage;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("digit_vision_{}_{name}", std::process::id()))
    }

    #[test]
    fn rgba_canvas_survives_a_png_trip() {
        let path = scratch("canvas.png");
        let mut canvas = OwnedImage::blank(56, 56).unwrap();
        canvas.paint_rect(10, 20, 5, 7, 33);

        save_rgba(&path, &canvas).expect("Error Saving File.");
        let loaded = load_rgba(&path).expect("Error Loading File.");
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, canvas);
    }

    #[test]
    fn grid_is_saved_as_dark_ink_on_white() {
        let path = scratch("grid.png");
        let mut grid = DigitGrid::default();
        grid.set(14, 3, 1.0);

        save_grid_png(&path, &grid).expect("Error Saving File.");
        let gray = image::open(&path).expect("Error Loading File.").into_luma8();
        std::fs::remove_file(&path).ok();

        assert_eq!(gray.dimensions(), (28, 28));
        assert_eq!(gray.get_pixel(3, 14).0[0], 0);
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_rgba(&scratch("does_not_exist.png")).is_err());
    }
}

use std::path::Path;

use image::{ImageError, RgbaImage};

/// Decoded RGBA8 pixels ready for `glTexImage2D`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Decodes any png/jpeg into RGBA8. OpenGL expects the first row to be the bottom
    /// of the image, so most callers want `flip_vertically`.
    pub fn load<P: AsRef<Path>>(path: P, flip_vertically: bool) -> Result<TextureImage, ImageError> {
        let image = image::open(path)?;
        let image = match flip_vertically {
            true => image.flipv(),
            false => image,
        };
        Ok(Self::from_rgba(image.to_rgba8()))
    }

    pub fn from_rgba(image: RgbaImage) -> TextureImage {
        TextureImage {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }

    /// Two-tone checkerboard, `cells` squares per side.
    pub fn checkerboard(size: u32, cells: u32) -> TextureImage {
        let cell = (size / cells.max(1)).max(1);
        Self::from_rgba(RgbaImage::from_fn(size, size, |x, y| {
            match ((x / cell) + (y / cell)) % 2 {
                0 => image::Rgba([255, 0, 255, 255]),
                _ => image::Rgba([24, 24, 24, 255]),
            }
        }))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_image() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |_, y| match y {
            0 => image::Rgba([255, 0, 0, 255]),
            _ => image::Rgba([0, 0, 255, 255]),
        })
    }

    #[test]
    fn loads_png_and_flips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.png");
        two_row_image().save(&path).unwrap();

        let upright = TextureImage::load(&path, false).unwrap();
        assert_eq!((upright.width(), upright.height()), (2, 2));
        assert_eq!(&upright.pixels()[..4], &[255, 0, 0, 255]);

        let flipped = TextureImage::load(&path, true).unwrap();
        assert_eq!(&flipped.pixels()[..4], &[0, 0, 255, 255]);
        assert_eq!(flipped.pixels().len(), 2 * 2 * 4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TextureImage::load(dir.path().join("nope.png"), true).is_err());
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let board = TextureImage::checkerboard(4, 2);
        let pixel = |x: usize, y: usize| {
            let start = (y * 4 + x) * 4;
            board.pixels()[start..start + 4].to_vec()
        };
        assert_eq!(pixel(0, 0), pixel(3, 3));
        assert_ne!(pixel(0, 0), pixel(2, 0));
    }
}

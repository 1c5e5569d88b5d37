// exif-footer/src/processors/loader.rs
use crate::core::{FooterError, Result};
use crate::utils::image_format_to_string;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// A decoded image together with the bytes it came from, so metadata can be
/// read without touching the file again.
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
}

#[derive(Clone)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<LoadedImage> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path)?;
        let bytes = std::fs::read(path)?;
        self.load_from_bytes(bytes)
    }

    pub fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<LoadedImage> {
        let reader = ImageReader::new(Cursor::new(bytes.as_slice())).with_guessed_format()?;
        let format = reader.format();
        let image = reader.decode().map_err(|e| {
            FooterError::ProcessingError(format!("Failed to decode image: {}", e))
        })?;

        log::info!(
            "Loaded image: {}x{} pixels, format: {}",
            image.width(),
            image.height(),
            format
                .map(image_format_to_string)
                .unwrap_or_else(|| "Unknown".to_string())
        );

        Ok(LoadedImage {
            bytes,
            image,
            format,
        })
    }

    fn validate_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(FooterError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let metadata = path.metadata()?;
        if metadata.len() == 0 {
            return Err(FooterError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn decodes_and_keeps_bytes() {
        let data = png_bytes(3, 2);
        let loaded = Loader::new().load_from_bytes(data.clone()).unwrap();
        assert_eq!((loaded.image.width(), loaded.image.height()), (3, 2));
        assert_eq!(loaded.format, Some(ImageFormat::Png));
        assert_eq!(loaded.bytes, data);
    }

    #[test]
    fn missing_file_is_rejected() {
        let result = Loader::new().load(Path::new("does/not/exist.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = Loader::new().load_from_bytes(vec![1, 2, 3, 4]);
        assert!(result.is_err());
    }
}

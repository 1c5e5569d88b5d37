// exif-footer/src/processors/resizer.rs
use crate::core::ResizeAlgorithm;
use image::{imageops::FilterType, DynamicImage};

pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Stretches the image to `width` and scales its height by the same
    /// factor, rounding down.
    pub fn fit_width(&self, image: &DynamicImage, width: u32) -> DynamicImage {
        let (width, height) = Self::calculate_dimensions(image.width(), image.height(), width);

        if width == image.width() && height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image.clone();
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.get_filter_type())
    }

    pub fn calculate_dimensions(orig_width: u32, orig_height: u32, width: u32) -> (u32, u32) {
        if width == 0 || orig_width == 0 || width == orig_width {
            return (orig_width, orig_height);
        }
        let height = orig_height as u64 * width as u64 / orig_width as u64;
        (width, (height as u32).max(1))
    }

    fn get_filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::Bicubic)
    }
}

// exif-footer/src/core/mod.rs
pub mod processor;

use crate::processors::{FooterLayout, MetadataStatus, Orientation};
use std::path::PathBuf;
use thiserror::Error;

/// Width, in pixels, the footer offsets and font ratios were designed for.
pub const REFERENCE_WIDTH: f32 = 3000.0;

pub const DEFAULT_FOOTER_IMAGE: &str = "Assets/Apple.jpeg";
pub const DEFAULT_FONT: &str = "Fonts/SFPRODISPLAYBOLD.OTF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FooterStyle {
    /// One line: model, focal length, aperture, shutter speed, ISO.
    #[default]
    Standard,
    /// Model name (Apple devices only), a settings line and a grey date line.
    BrandSpecific,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

#[derive(Debug, Clone)]
pub struct FooterConfig {
    pub style: FooterStyle,
    pub footer_image: PathBuf,
    pub font_path: PathBuf,
    pub quality: u8,
    pub algorithm: ResizeAlgorithm,
    pub reference_width: f32,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            style: FooterStyle::Standard,
            footer_image: resolve_asset(DEFAULT_FOOTER_IMAGE),
            font_path: resolve_asset(DEFAULT_FONT),
            quality: 85,
            algorithm: ResizeAlgorithm::Bicubic,
            reference_width: REFERENCE_WIDTH,
        }
    }
}

impl FooterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.quality == 0 || self.quality > 100 {
            return Err(FooterError::InvalidParameter(
                "Quality must be between 1 and 100".to_string(),
            ));
        }

        if !(self.reference_width.is_finite() && self.reference_width > 0.0) {
            return Err(FooterError::InvalidParameter(format!(
                "Reference width must be positive, got {}",
                self.reference_width
            )));
        }

        Ok(())
    }
}

/// Looks for a bundled asset next to the executable first, then falls back
/// to the path relative to the working directory.
pub fn resolve_asset(relative: &str) -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(relative)));

    match beside_exe {
        Some(path) if path.exists() => path,
        _ => PathBuf::from(relative),
    }
}

/// Pixel density carried over from the input file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    pub x: f64,
    pub y: f64,
}

impl Dpi {
    pub fn new(x: f64, y: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(x) && valid(y)).then_some(Self { x, y })
    }

    pub fn rounded(&self) -> (u16, u16) {
        let clamp = |v: f64| v.round().clamp(1.0, u16::MAX as f64) as u16;
        (clamp(self.x), clamp(self.y))
    }
}

/// What a successful footer run produced.
#[derive(Debug)]
pub struct FooterReport {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub metadata: MetadataStatus,
    pub orientation: Option<Orientation>,
    pub dpi: Option<Dpi>,
    pub exif_embedded: bool,
    pub layout: FooterLayout,
}

#[derive(Error, Debug)]
pub enum FooterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

pub type Result<T> = std::result::Result<T, FooterError>;

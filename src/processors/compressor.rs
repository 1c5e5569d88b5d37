// exif-footer/src/processors/compressor.rs
use crate::core::{Dpi, FooterError, Result};
use crate::utils::format_file_size;
use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{ExtendedColorType, ImageFormat, RgbImage};
use img_parts::png::PngChunk;
use img_parts::{Bytes, DynImage, ImageEXIF};
use std::io::Cursor;
use std::path::Path;

/// Metadata to carry into the written file.
#[derive(Debug, Clone, Default)]
pub struct OutputMetadata {
    pub dpi: Option<Dpi>,
    /// TIFF-structured EXIF payload.
    pub exif: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub exif_embedded: bool,
    pub dpi_embedded: bool,
}

pub struct Compressor {
    quality: u8,
}

impl Compressor {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn save(&self, image: &RgbImage, path: &Path, metadata: &OutputMetadata) -> Result<SaveOutcome> {
        let format = self.detect_format(path)?;
        log::debug!(
            "Saving image to {} with format {:?}, quality: {}",
            path.display(),
            format,
            self.quality
        );

        let (encoded, mut outcome) = self.encode(image, format, metadata.dpi)?;
        let output = self.embed_metadata(encoded, format, metadata, &mut outcome);

        std::fs::write(path, output)?;
        self.log_save_result(path)?;
        Ok(outcome)
    }

    pub fn encode(
        &self,
        image: &RgbImage,
        format: ImageFormat,
        dpi: Option<Dpi>,
    ) -> Result<(Vec<u8>, SaveOutcome)> {
        let mut buffer = Cursor::new(Vec::new());
        let mut outcome = SaveOutcome {
            exif_embedded: false,
            dpi_embedded: false,
        };

        match format {
            ImageFormat::Jpeg => {
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                if let Some(dpi) = dpi {
                    let (x, y) = dpi.rounded();
                    encoder.set_pixel_density(PixelDensity {
                        density: (x, y),
                        unit: PixelDensityUnit::Inches,
                    });
                    outcome.dpi_embedded = true;
                }
                encoder.encode(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgb8,
                )?;
            }
            _ => image.write_to(&mut buffer, format)?,
        }

        Ok((buffer.into_inner(), outcome))
    }

    // Failing to attach metadata is not fatal; the pixels are what matter.
    fn embed_metadata(
        &self,
        encoded: Vec<u8>,
        format: ImageFormat,
        metadata: &OutputMetadata,
        outcome: &mut SaveOutcome,
    ) -> Vec<u8> {
        let wants_phys = format == ImageFormat::Png && metadata.dpi.is_some();
        if metadata.exif.is_none() && !wants_phys {
            return encoded;
        }

        let mut container = match DynImage::from_bytes(Bytes::from(encoded.clone())) {
            Ok(Some(container)) => container,
            Ok(None) => {
                log::warn!("{:?} output cannot carry EXIF, saving without it", format);
                return encoded;
            }
            Err(e) => {
                log::warn!("Could not re-open encoded {:?} output: {}", format, e);
                return encoded;
            }
        };

        if let Some(exif) = &metadata.exif {
            container.set_exif(Some(Bytes::from(exif.clone())));
            outcome.exif_embedded = true;
        }

        if let (DynImage::Png(png), Some(dpi)) = (&mut container, metadata.dpi) {
            png.remove_chunks_by_type(*b"pHYs");
            let chunk = PngChunk::new(*b"pHYs", Bytes::from(phys_contents(dpi)));
            // right after IHDR
            png.chunks_mut().insert(1, chunk);
            outcome.dpi_embedded = true;
        }

        container.encoder().bytes().to_vec()
    }

    pub fn detect_format(&self, path: &Path) -> Result<ImageFormat> {
        ImageFormat::from_path(path).map_err(|_| {
            FooterError::UnsupportedFormat(format!(
                "Cannot determine output format for {}",
                path.display()
            ))
        })
    }

    fn log_save_result(&self, path: &Path) -> Result<()> {
        let file_size = std::fs::metadata(path)?.len();
        log::info!("Saved image: {} ({})", path.display(), format_file_size(file_size));
        Ok(())
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(85)
    }
}

fn phys_contents(dpi: Dpi) -> Vec<u8> {
    let per_metre = |v: f64| (v / 0.0254).round() as u32;
    let mut contents = Vec::with_capacity(9);
    contents.extend_from_slice(&per_metre(dpi.x).to_be_bytes());
    contents.extend_from_slice(&per_metre(dpi.y).to_be_bytes());
    contents.push(1);
    contents
}

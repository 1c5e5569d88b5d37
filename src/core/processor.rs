// exif-footer/src/core/processor.rs
use super::{FooterConfig, FooterError, FooterReport, Result};
use crate::processors::prelude::*;
use crate::processors::{
    correct_orientation, draw_layout, reset_orientation, stack, ExtractedMetadata,
    FontTypesetter, FooterLayout, OutputMetadata, Typesetter,
};
use std::path::Path;

pub struct FooterProcessor {
    config: FooterConfig,
    loader: Loader,
    resizer: Resizer,
    compressor: Compressor,
    metadata_reader: MetadataReader,
    typesetter: Box<dyn Typesetter>,
}

impl FooterProcessor {
    /// Validates the configuration and loads the configured font.
    pub fn new(config: FooterConfig) -> Result<Self> {
        config.validate()?;
        let typesetter = FontTypesetter::load(&config.font_path)?;
        Self::with_typesetter(config, Box::new(typesetter))
    }

    pub fn with_typesetter(config: FooterConfig, typesetter: Box<dyn Typesetter>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            loader: Loader::new(),
            resizer: Resizer::new(config.algorithm),
            compressor: Compressor::new(config.quality),
            metadata_reader: MetadataReader::new(),
            typesetter,
            config,
        })
    }

    /// Corrects orientation, stacks the watermark under the photo, draws the
    /// EXIF text and writes the result.
    pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<FooterReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        self.validate_paths(input_path, output_path)?;

        let loaded = self.loader.load(input_path)?;
        let ExtractedMetadata {
            record,
            raw,
            status,
        } = self.metadata_reader.extract(&loaded.bytes);
        let dpi = self.metadata_reader.read_dpi(&loaded.bytes, &record);

        let (photo, orientation) = correct_orientation(loaded.image, record.orientation());

        let watermark = self.loader.load(&self.config.footer_image)?;
        let footer = self.resizer.fit_width(&watermark.image, photo.width());
        let mut canvas = stack(&photo, &footer);

        let layout = FooterLayout::compute(
            self.config.style,
            &record,
            photo.width(),
            photo.height(),
            self.config.reference_width,
        );
        draw_layout(&mut canvas, &layout, self.typesetter.as_ref());

        let exif = raw.map(|mut payload| {
            if orientation.is_some_and(|o| !o.is_identity()) && reset_orientation(&mut payload) {
                log::debug!("Reset orientation tag in the saved EXIF");
            }
            payload
        });
        let saved = self
            .compressor
            .save(&canvas, output_path, &OutputMetadata { dpi, exif })?;

        Ok(FooterReport {
            output_path: output_path.to_path_buf(),
            width: canvas.width(),
            height: canvas.height(),
            metadata: status,
            orientation,
            dpi: dpi.filter(|_| saved.dpi_embedded),
            exif_embedded: saved.exif_embedded,
            layout,
        })
    }

    fn validate_paths(&self, input_path: &Path, output_path: &Path) -> Result<()> {
        if !input_path.exists() {
            return Err(FooterError::InvalidParameter(format!(
                "Input file does not exist: {}",
                input_path.display()
            )));
        }

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Ok(())
    }
}

/// Reads the metadata of one image without compositing anything.
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<ExtractedMetadata> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FooterError::InvalidParameter(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    let data = std::fs::read(path)?;
    if image::guess_format(&data).is_err() {
        return Err(FooterError::UnsupportedFormat(format!(
            "Not a recognised image: {}",
            path.display()
        )));
    }
    Ok(MetadataReader::new().extract(&data))
}

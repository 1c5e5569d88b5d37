mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{Algorithm, Cli, Commands};
pub use crate::core::processor::{inspect, FooterProcessor};
pub use crate::core::{
    resolve_asset, Dpi, FooterConfig, FooterError, FooterReport, FooterStyle, ResizeAlgorithm,
    Result, DEFAULT_FONT, DEFAULT_FOOTER_IMAGE, REFERENCE_WIDTH,
};
pub use crate::processors::{
    all_fields, correct_orientation, draw_layout, format_date_time, format_field, format_number,
    format_value, render_exif_listing, render_selected_listing, reset_orientation, selected_fields, stack,
    tag_name, Compressor, ExifRecord, ExifValue, ExtractedMetadata, FontSizes, FontTypesetter,
    FooterLayout, FormattedField, LoadedImage, Loader, MetadataReader, MetadataStatus,
    Orientation, OutputMetadata, Resizer, SaveOutcome, TextElement, TextRole, Typesetter,
    BLACK, GREY, SELECTED_FIELDS, UNKNOWN,
};
pub use crate::utils::{format_file_size, generate_output_path};

pub mod prelude {
    pub use crate::{
        inspect, ExifRecord, FooterConfig, FooterProcessor, FooterStyle, MetadataReader,
        Typesetter,
    };
}

// Re-export commonly used types
pub use image::{DynamicImage, RgbImage};

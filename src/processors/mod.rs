// exif-footer/src/processors/mod.rs
mod compressor;
mod fields;
mod footer;
mod loader;
mod metadata;
mod orientation;
mod resizer;

pub use compressor::{Compressor, OutputMetadata, SaveOutcome};
pub use fields::{
    all_fields, format_date_time, format_field, format_value, render_exif_listing,
    render_selected_listing, selected_fields, FormattedField, SELECTED_FIELDS, UNKNOWN,
};
pub use footer::{
    draw_layout, stack, FontSizes, FontTypesetter, FooterLayout, TextElement, TextRole,
    Typesetter, BLACK, GREY,
};
pub use loader::{LoadedImage, Loader};
pub use metadata::{
    format_number, tag_name, ExifRecord, ExifValue, ExtractedMetadata, MetadataReader,
    MetadataStatus,
};
pub use orientation::{correct_orientation, reset_orientation, Orientation};
pub use resizer::Resizer;

pub mod prelude {
    pub use super::{Compressor, Loader, MetadataReader, Resizer};
}

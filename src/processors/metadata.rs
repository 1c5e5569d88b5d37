// exif-footer/src/processors/metadata.rs
use crate::core::{Dpi, FooterError, Result};
use exif::{Context, Exif, Field, In, Reader, Tag, Value};
use image::ImageFormat;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::Bytes;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

/// PIL-style names for the tags photographers usually care about. Anything
/// else falls back to the EXIF crate's own name, or the numeric ID.
static TAG_NAMES: &[(Context, u16, &str)] = &[
    (Context::Tiff, 0x010E, "ImageDescription"),
    (Context::Tiff, 0x010F, "Make"),
    (Context::Tiff, 0x0110, "Model"),
    (Context::Tiff, 0x0112, "Orientation"),
    (Context::Tiff, 0x011A, "XResolution"),
    (Context::Tiff, 0x011B, "YResolution"),
    (Context::Tiff, 0x0128, "ResolutionUnit"),
    (Context::Tiff, 0x0131, "Software"),
    (Context::Tiff, 0x0132, "DateTime"),
    (Context::Tiff, 0x013B, "Artist"),
    (Context::Tiff, 0x013E, "WhitePoint"),
    (Context::Tiff, 0x013F, "PrimaryChromaticities"),
    (Context::Tiff, 0x0211, "YCbCrCoefficients"),
    (Context::Tiff, 0x0213, "YCbCrPositioning"),
    (Context::Tiff, 0x8298, "Copyright"),
    (Context::Tiff, 0x8769, "ExifOffset"),
    (Context::Tiff, 0x8825, "GPSInfo"),
    (Context::Exif, 0x829A, "ExposureTime"),
    (Context::Exif, 0x829D, "FNumber"),
    (Context::Exif, 0x8822, "ExposureProgram"),
    (Context::Exif, 0x8827, "ISOSpeedRatings"),
    (Context::Exif, 0x8830, "SensitivityType"),
    (Context::Exif, 0x8832, "RecommendedExposureIndex"),
    (Context::Exif, 0x9000, "ExifVersion"),
    (Context::Exif, 0x9003, "DateTimeOriginal"),
    (Context::Exif, 0x9004, "DateTimeDigitized"),
    (Context::Exif, 0x9010, "OffsetTime"),
    (Context::Exif, 0x9011, "OffsetTimeOriginal"),
    (Context::Exif, 0x9012, "OffsetTimeDigitized"),
    (Context::Exif, 0x9101, "ComponentsConfiguration"),
    (Context::Exif, 0x9102, "CompressedBitsPerPixel"),
    (Context::Exif, 0x9201, "ShutterSpeedValue"),
    (Context::Exif, 0x9202, "ApertureValue"),
    (Context::Exif, 0x9203, "BrightnessValue"),
    (Context::Exif, 0x9204, "ExposureBiasValue"),
    (Context::Exif, 0x9205, "MaxApertureValue"),
    (Context::Exif, 0x9206, "SubjectDistance"),
    (Context::Exif, 0x9207, "MeteringMode"),
    (Context::Exif, 0x9208, "LightSource"),
    (Context::Exif, 0x9209, "Flash"),
    (Context::Exif, 0x920A, "FocalLength"),
    (Context::Exif, 0x9214, "SubjectLocation"),
    (Context::Exif, 0x927C, "MakerNote"),
    (Context::Exif, 0x9286, "UserComment"),
    (Context::Exif, 0x9290, "SubsecTime"),
    (Context::Exif, 0x9291, "SubsecTimeOriginal"),
    (Context::Exif, 0x9292, "SubsecTimeDigitized"),
    (Context::Exif, 0xA000, "FlashPixVersion"),
    (Context::Exif, 0xA001, "ColorSpace"),
    (Context::Exif, 0xA002, "ExifImageWidth"),
    (Context::Exif, 0xA003, "ExifImageHeight"),
    (Context::Exif, 0xA005, "ExifInteroperabilityOffset"),
    (Context::Exif, 0xA217, "SensingMethod"),
    (Context::Exif, 0xA300, "FileSource"),
    (Context::Exif, 0xA301, "SceneType"),
    (Context::Exif, 0xA401, "CustomRendered"),
    (Context::Exif, 0xA402, "ExposureMode"),
    (Context::Exif, 0xA403, "WhiteBalance"),
    (Context::Exif, 0xA404, "DigitalZoomRatio"),
    (Context::Exif, 0xA405, "FocalLengthIn35mmFilm"),
    (Context::Exif, 0xA406, "SceneCaptureType"),
    (Context::Exif, 0xA407, "GainControl"),
    (Context::Exif, 0xA408, "Contrast"),
    (Context::Exif, 0xA409, "Saturation"),
    (Context::Exif, 0xA40A, "Sharpness"),
    (Context::Exif, 0xA40C, "SubjectDistanceRange"),
    (Context::Exif, 0xA420, "ImageUniqueID"),
    (Context::Exif, 0xA430, "CameraOwnerName"),
    (Context::Exif, 0xA431, "BodySerialNumber"),
    (Context::Exif, 0xA432, "LensSpecification"),
    (Context::Exif, 0xA433, "LensMake"),
    (Context::Exif, 0xA434, "LensModel"),
    (Context::Exif, 0xA435, "LensSerialNumber"),
];

/// Canonical name for a tag.
pub fn tag_name(tag: Tag) -> String {
    if let Some((_, _, name)) = TAG_NAMES
        .iter()
        .find(|(context, number, _)| *context == tag.context() && *number == tag.number())
    {
        return (*name).to_string();
    }

    if tag.description().is_some() {
        tag.to_string()
    } else {
        tag.number().to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExifValue {
    Integer(i64),
    Rational(f64),
    Text(String),
}

impl ExifValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ExifValue::Integer(v) => Some(*v as f64),
            ExifValue::Rational(v) => Some(*v),
            ExifValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ExifValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn from_field(field: &Field, exif: Option<&Exif>) -> Self {
        match &field.value {
            Value::Ascii(parts) => ExifValue::Text(
                parts
                    .iter()
                    .map(|part| String::from_utf8_lossy(part).trim_matches(char::from(0)).trim().to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Value::Byte(v) if v.len() == 1 => ExifValue::Integer(v[0] as i64),
            Value::Short(v) if v.len() == 1 => ExifValue::Integer(v[0] as i64),
            Value::Long(v) if v.len() == 1 => ExifValue::Integer(v[0] as i64),
            Value::SByte(v) if v.len() == 1 => ExifValue::Integer(v[0] as i64),
            Value::SShort(v) if v.len() == 1 => ExifValue::Integer(v[0] as i64),
            Value::SLong(v) if v.len() == 1 => ExifValue::Integer(v[0] as i64),
            Value::Rational(v) if v.len() == 1 => ExifValue::Rational(v[0].to_f64()),
            Value::SRational(v) if v.len() == 1 => ExifValue::Rational(v[0].to_f64()),
            Value::Float(v) if v.len() == 1 => ExifValue::Rational(v[0] as f64),
            Value::Double(v) if v.len() == 1 => ExifValue::Rational(v[0]),
            _ => match exif {
                Some(exif) => ExifValue::Text(field.display_value().with_unit(exif).to_string()),
                None => ExifValue::Text(field.display_value().to_string()),
            },
        }
    }
}

impl fmt::Display for ExifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExifValue::Integer(v) => write!(f, "{}", v),
            ExifValue::Rational(v) => write!(f, "{}", format_number(*v)),
            ExifValue::Text(s) => f.write_str(s),
        }
    }
}

/// Prints whole numbers without a fractional part ("2" rather than "2.0").
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Decoded tag name to value mapping for one image, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifRecord {
    fields: BTreeMap<String, ExifValue>,
}

impl ExifRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_exif(exif: &Exif) -> Self {
        let mut record = Self::new();
        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            record.insert(tag_name(field.tag), ExifValue::from_field(field, Some(exif)));
        }
        record
    }

    /// Later entries overwrite earlier ones under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: ExifValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ExifValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ExifValue::as_text)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExifValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn orientation(&self) -> Option<u32> {
        match self.get("Orientation")? {
            ExifValue::Integer(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, ExifValue)> for ExifRecord {
    fn from_iter<I: IntoIterator<Item = (K, ExifValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataStatus {
    Present,
    Absent,
    /// The blob was there but could not be parsed; the record is empty.
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    pub record: ExifRecord,
    /// TIFF-structured EXIF payload, as stored in the container.
    pub raw: Option<Vec<u8>>,
    pub status: MetadataStatus,
}

impl ExtractedMetadata {
    pub fn absent() -> Self {
        Self {
            record: ExifRecord::new(),
            raw: None,
            status: MetadataStatus::Absent,
        }
    }
}

pub struct MetadataReader;

impl MetadataReader {
    pub fn new() -> Self {
        Self
    }

    /// `Ok(None)` when the container has no EXIF or no way of carrying it.
    pub fn read_exif(&self, data: &[u8]) -> Result<Option<Exif>> {
        if let Ok(format) = image::guess_format(data) {
            if !carries_exif(format) {
                log::debug!("{:?} has no EXIF accessor", format);
                return Ok(None);
            }
        }

        match Reader::new().read_from_container(&mut Cursor::new(data)) {
            Ok(exif) => Ok(Some(exif)),
            Err(exif::Error::NotFound(_)) => Ok(None),
            Err(e) => Err(FooterError::Metadata(format!("EXIF read error: {}", e))),
        }
    }

    /// Never fails: unreadable metadata is logged and reported as empty.
    pub fn extract(&self, data: &[u8]) -> ExtractedMetadata {
        match self.read_exif(data) {
            Ok(Some(exif)) => {
                let record = ExifRecord::from_exif(&exif);
                log::debug!("Found {} EXIF fields", record.len());
                ExtractedMetadata {
                    record,
                    raw: Some(exif.buf().to_vec()),
                    status: MetadataStatus::Present,
                }
            }
            Ok(None) => {
                log::debug!("No EXIF data found");
                ExtractedMetadata::absent()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable EXIF: {}", e);
                ExtractedMetadata {
                    status: MetadataStatus::Unreadable(e.to_string()),
                    ..ExtractedMetadata::absent()
                }
            }
        }
    }

    pub fn read_path(&self, path: &Path) -> Result<ExtractedMetadata> {
        let data = std::fs::read(path)?;
        Ok(self.extract(&data))
    }

    /// Resolution of the source file: JFIF density, PNG `pHYs`, then the
    /// EXIF resolution tags.
    pub fn read_dpi(&self, data: &[u8], record: &ExifRecord) -> Option<Dpi> {
        let container = match image::guess_format(data) {
            Ok(ImageFormat::Jpeg) => jfif_density(data),
            Ok(ImageFormat::Png) => png_density(data),
            _ => None,
        };
        container.or_else(|| exif_density(record))
    }
}

impl Default for MetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

fn carries_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP | ImageFormat::Avif
    )
}

fn jfif_density(data: &[u8]) -> Option<Dpi> {
    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(data)).ok()?;
    let app0 = jpeg
        .segments()
        .iter()
        .find(|s| s.marker() == 0xE0 && s.contents().starts_with(b"JFIF\0"))?;
    let c = app0.contents();
    if c.len() < 12 {
        return None;
    }

    let x = u16::from_be_bytes([c[8], c[9]]) as f64;
    let y = u16::from_be_bytes([c[10], c[11]]) as f64;
    match c[7] {
        1 => Dpi::new(x, y),
        2 => Dpi::new(x * 2.54, y * 2.54),
        // 0 only records the aspect ratio
        _ => None,
    }
}

fn png_density(data: &[u8]) -> Option<Dpi> {
    let png = Png::from_bytes(Bytes::copy_from_slice(data)).ok()?;
    let phys = png.chunk_by_type(*b"pHYs")?;
    let c = phys.contents();
    if c.len() < 9 || c[8] != 1 {
        return None;
    }

    let x = u32::from_be_bytes([c[0], c[1], c[2], c[3]]) as f64;
    let y = u32::from_be_bytes([c[4], c[5], c[6], c[7]]) as f64;
    Dpi::new(x * 0.0254, y * 0.0254)
}

fn exif_density(record: &ExifRecord) -> Option<Dpi> {
    let x = record.get("XResolution")?.as_f64()?;
    let y = record.get("YResolution")?.as_f64()?;
    match record.get("ResolutionUnit").and_then(ExifValue::as_f64) {
        Some(unit) if unit == 3.0 => Dpi::new(x * 2.54, y * 2.54),
        Some(unit) if unit == 1.0 => None,
        _ => Dpi::new(x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use img_parts::ImageEXIF;

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn names_come_from_static_table() {
        assert_eq!(tag_name(Tag::PhotographicSensitivity), "ISOSpeedRatings");
        assert_eq!(tag_name(Tag::FocalLengthIn35mmFilm), "FocalLengthIn35mmFilm");
        assert_eq!(tag_name(Tag::Make), "Make");
    }

    #[test]
    fn unknown_tag_passes_through_as_number() {
        assert_eq!(tag_name(Tag(Context::Exif, 0xBEEF)), "48879");
    }

    #[test]
    fn converts_field_values() {
        let ascii = field(Tag::Make, Value::Ascii(vec![b"Canon\0".to_vec()]));
        assert_eq!(ExifValue::from_field(&ascii, None), ExifValue::Text("Canon".into()));

        let short = field(Tag::PhotographicSensitivity, Value::Short(vec![400]));
        assert_eq!(ExifValue::from_field(&short, None), ExifValue::Integer(400));

        let rational = field(
            Tag::ExposureTime,
            Value::Rational(vec![exif::Rational { num: 1, denom: 250 }]),
        );
        assert_eq!(ExifValue::from_field(&rational, None), ExifValue::Rational(0.004));
    }

    #[test]
    fn later_duplicates_overwrite() {
        let record: ExifRecord = vec![
            ("Model", ExifValue::Text("first".into())),
            ("Model", ExifValue::Text("second".into())),
        ]
        .into_iter()
        .collect();
        assert_eq!(record.len(), 1);
        assert_eq!(record.text("Model"), Some("second"));
    }

    #[test]
    fn record_iterates_sorted_by_name() {
        let record: ExifRecord = vec![
            ("Model", ExifValue::Text("X".into())),
            ("FNumber", ExifValue::Rational(2.8)),
            ("Make", ExifValue::Text("Y".into())),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["FNumber", "Make", "Model"]);
    }

    #[test]
    fn garbage_is_absent_not_fatal() {
        let reader = MetadataReader::new();
        let extracted = reader.extract(&[0u8; 32]);
        assert!(extracted.record.is_empty());
        assert!(extracted.raw.is_none());
    }

    #[test]
    fn corrupt_exif_is_reported_as_unreadable() {
        let mut data = Vec::new();
        image::RgbImage::new(2, 2)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)
            .unwrap();
        let mut jpeg = Jpeg::from_bytes(Bytes::from(data)).unwrap();
        jpeg.set_exif(Some(Bytes::from_static(b"not a tiff header")));
        let data = jpeg.encoder().bytes().to_vec();

        let reader = MetadataReader::new();
        assert!(reader.read_exif(&data).is_err());

        let extracted = reader.extract(&data);
        assert!(matches!(extracted.status, MetadataStatus::Unreadable(_)));
        assert!(extracted.record.is_empty());
        assert!(extracted.raw.is_none());
    }

    #[test]
    fn bmp_has_no_metadata_accessor() {
        let mut data = Vec::new();
        image::RgbImage::new(2, 2)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Bmp)
            .unwrap();
        let reader = MetadataReader::new();
        assert!(reader.read_exif(&data).unwrap().is_none());
        assert_eq!(reader.extract(&data).status, MetadataStatus::Absent);
    }

    #[test]
    fn exif_density_honours_centimetres() {
        let record: ExifRecord = vec![
            ("XResolution", ExifValue::Rational(100.0)),
            ("YResolution", ExifValue::Rational(100.0)),
            ("ResolutionUnit", ExifValue::Integer(3)),
        ]
        .into_iter()
        .collect();
        let dpi = exif_density(&record).unwrap();
        assert_eq!(dpi.rounded(), (254, 254));
    }

    #[test]
    fn orientation_reads_integer_tag() {
        let record: ExifRecord = vec![("Orientation", ExifValue::Integer(6))].into_iter().collect();
        assert_eq!(record.orientation(), Some(6));
        assert_eq!(ExifRecord::new().orientation(), None);
    }
}

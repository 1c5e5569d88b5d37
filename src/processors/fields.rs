// exif-footer/src/processors/fields.rs
use super::metadata::{format_number, ExifRecord, ExifValue};
use chrono::NaiveDateTime;

pub const UNKNOWN: &str = "Unknown";

/// Fields shown by the selected-fields listing, in display order.
pub const SELECTED_FIELDS: [&str; 9] = [
    "Make",
    "Model",
    "LensModel",
    "FocalLength",
    "FocalLengthIn35mmFilm",
    "FNumber",
    "ApertureValue",
    "ISOSpeedRatings",
    "ExposureTime",
];

type Formatter = fn(&ExifValue) -> Option<String>;

static FORMATTERS: &[(&str, Formatter)] = &[
    ("FocalLength", millimetres),
    ("FocalLengthIn35mmFilm", millimetres),
    ("FNumber", f_number),
    ("ExposureTime", exposure_time),
    ("ApertureValue", aperture_value),
    ("ISOSpeedRatings", iso),
    ("DateTimeOriginal", date_time),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedField {
    pub name: String,
    pub value: String,
}

// Zero, negative and non-finite readings display as Unknown.
fn measured(value: &ExifValue, render: fn(f64) -> String) -> Option<String> {
    let v = value.as_f64()?;
    Some(if v.is_finite() && v > 0.0 {
        render(v)
    } else {
        UNKNOWN.to_string()
    })
}

fn millimetres(value: &ExifValue) -> Option<String> {
    measured(value, |v| format!("{}mm", v.trunc() as i64))
}

fn f_number(value: &ExifValue) -> Option<String> {
    measured(value, |v| format!("f/{:.1}", v))
}

fn exposure_time(value: &ExifValue) -> Option<String> {
    measured(value, |seconds| {
        if seconds < 1.0 {
            format!("1/{}s", (1.0 / seconds).round() as i64)
        } else {
            format!("{}s", format_number(seconds))
        }
    })
}

// APEX 0 is f/1.
fn aperture_value(value: &ExifValue) -> Option<String> {
    let v = value.as_f64()?;
    Some(if v.is_finite() {
        format!("{:.2}", v)
    } else {
        UNKNOWN.to_string()
    })
}

fn iso(value: &ExifValue) -> Option<String> {
    measured(value, |v| format!("ISO {}", format_number(v)))
}

fn date_time(value: &ExifValue) -> Option<String> {
    Some(format_date_time(value.as_text()))
}

/// "YYYY:MM:DD HH:MM:SS" to "YYYY/MM/DD HH:MM:SS"; anything else is "Unknown".
pub fn format_date_time(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S").ok())
        .map(|dt| dt.format("%Y/%m/%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Display string for one value. Values a rule cannot interpret are shown
/// verbatim.
pub fn format_value(name: &str, value: &ExifValue) -> String {
    FORMATTERS
        .iter()
        .find(|(field, _)| *field == name)
        .and_then(|(_, format)| format(value))
        .unwrap_or_else(|| value.to_string())
}

pub fn format_field(record: &ExifRecord, name: &str) -> String {
    match record.get(name) {
        Some(value) => format_value(name, value),
        None => UNKNOWN.to_string(),
    }
}

pub fn selected_fields(record: &ExifRecord) -> Vec<FormattedField> {
    SELECTED_FIELDS
        .iter()
        .map(|name| FormattedField {
            name: (*name).to_string(),
            value: format_field(record, name),
        })
        .collect()
}

pub fn all_fields(record: &ExifRecord) -> Vec<FormattedField> {
    record
        .iter()
        .map(|(name, value)| FormattedField {
            name: name.to_string(),
            value: format_value(name, value),
        })
        .collect()
}

const RULE: &str = "========================================";

fn listing_header(out: &mut String) {
    out.push_str("\nEXIF data:\n");
    out.push_str(RULE);
    out.push('\n');
}

/// Every decoded field, sorted by tag name.
pub fn render_exif_listing(record: &ExifRecord) -> String {
    let mut out = String::new();
    listing_header(&mut out);
    if record.is_empty() {
        out.push_str("No EXIF data found.\n");
        return out;
    }

    for field in all_fields(record) {
        out.push_str(&format!("{}: {}\n", field.name, field.value));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

/// The selected fields in fixed order, then their values as a list.
pub fn render_selected_listing(record: &ExifRecord) -> String {
    let mut out = String::new();
    listing_header(&mut out);
    if record.is_empty() {
        out.push_str("No EXIF data found.\n");
        return out;
    }

    let fields = selected_fields(record);
    out.push_str("Selected EXIF fields:\n");
    for field in &fields {
        out.push_str(&format!("{}: {}\n", field.name, field.value));
    }

    let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
    out.push_str(&format!("\nValues:\n{:?}\n", values));
    out.push_str(RULE);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: Vec<(&str, ExifValue)>) -> ExifRecord {
        entries.into_iter().collect()
    }

    #[test]
    fn missing_selected_fields_are_unknown() {
        let fields = selected_fields(&ExifRecord::new());
        assert_eq!(fields.len(), 9);
        assert!(fields.iter().all(|f| f.value == UNKNOWN));
    }

    #[test]
    fn f_number_rounds_to_one_decimal() {
        assert_eq!(format_value("FNumber", &ExifValue::Rational(2.8)), "f/2.8");
        assert_eq!(format_value("FNumber", &ExifValue::Rational(2.83)), "f/2.8");
        assert_eq!(format_value("FNumber", &ExifValue::Integer(8)), "f/8.0");
    }

    #[test]
    fn exposure_time_uses_fractions_below_one_second() {
        assert_eq!(format_value("ExposureTime", &ExifValue::Rational(0.004)), "1/250s");
        assert_eq!(format_value("ExposureTime", &ExifValue::Integer(2)), "2s");
        assert_eq!(format_value("ExposureTime", &ExifValue::Rational(2.0)), "2s");
        assert_eq!(format_value("ExposureTime", &ExifValue::Rational(2.5)), "2.5s");
        assert_eq!(format_value("ExposureTime", &ExifValue::Rational(1.0 / 3.0)), "1/3s");
    }

    #[test]
    fn placeholder_readings_are_unknown() {
        assert_eq!(format_value("ExposureTime", &ExifValue::Rational(0.0)), UNKNOWN);
        assert_eq!(format_value("ExposureTime", &ExifValue::Integer(0)), UNKNOWN);
        assert_eq!(format_value("ExposureTime", &ExifValue::Rational(f64::NAN)), UNKNOWN);
        assert_eq!(format_value("FNumber", &ExifValue::Rational(f64::NAN)), UNKNOWN);
        assert_eq!(format_value("FNumber", &ExifValue::Rational(f64::INFINITY)), UNKNOWN);
        assert_eq!(format_value("FocalLength", &ExifValue::Rational(-1.0)), UNKNOWN);
        assert_eq!(format_value("ISOSpeedRatings", &ExifValue::Integer(0)), UNKNOWN);
        assert_eq!(format_value("ApertureValue", &ExifValue::Rational(f64::NAN)), UNKNOWN);
        assert_eq!(format_value("ApertureValue", &ExifValue::Rational(0.0)), "0.00");
    }

    #[test]
    fn focal_lengths_get_millimetres() {
        assert_eq!(format_value("FocalLength", &ExifValue::Rational(5.7)), "5mm");
        assert_eq!(format_value("FocalLengthIn35mmFilm", &ExifValue::Integer(26)), "26mm");
    }

    #[test]
    fn aperture_and_iso() {
        assert_eq!(format_value("ApertureValue", &ExifValue::Rational(1.69599)), "1.70");
        assert_eq!(format_value("ISOSpeedRatings", &ExifValue::Integer(100)), "ISO 100");
    }

    #[test]
    fn pass_through_fields_are_verbatim() {
        assert_eq!(format_value("Make", &ExifValue::Text("Apple".into())), "Apple");
        assert_eq!(format_value("LensModel", &ExifValue::Text("RF24-105mm F4 L".into())), "RF24-105mm F4 L");
    }

    #[test]
    fn non_numeric_value_is_shown_verbatim() {
        assert_eq!(format_value("FNumber", &ExifValue::Text("wide".into())), "wide");
    }

    #[test]
    fn date_time_reformats() {
        assert_eq!(format_date_time(Some("2023:05:10 14:30:00")), "2023/05/10 14:30:00");
        assert_eq!(format_date_time(Some("")), UNKNOWN);
        assert_eq!(format_date_time(None), UNKNOWN);
        assert_eq!(format_date_time(Some("yesterday")), UNKNOWN);
        assert_eq!(
            format_value("DateTimeOriginal", &ExifValue::Integer(5)),
            UNKNOWN
        );
    }

    #[test]
    fn selected_order_is_fixed() {
        // inserted in reverse; the record itself iterates alphabetically
        let rec = record(vec![
            ("ExposureTime", ExifValue::Rational(0.01)),
            ("ISOSpeedRatings", ExifValue::Integer(50)),
            ("ApertureValue", ExifValue::Rational(1.0)),
            ("FNumber", ExifValue::Rational(1.8)),
            ("FocalLengthIn35mmFilm", ExifValue::Integer(24)),
            ("FocalLength", ExifValue::Rational(6.0)),
            ("LensModel", ExifValue::Text("Lens".into())),
            ("Model", ExifValue::Text("Body".into())),
            ("Make", ExifValue::Text("Maker".into())),
        ]);
        let names: Vec<_> = selected_fields(&rec).into_iter().map(|f| f.name).collect();
        assert_eq!(names, SELECTED_FIELDS);
    }

    #[test]
    fn selected_listing_ends_with_value_list() {
        let rec = record(vec![
            ("Make", ExifValue::Text("Canon".into())),
            ("FNumber", ExifValue::Rational(4.0)),
        ]);
        let text = render_selected_listing(&rec);
        assert!(text.contains("Make: Canon\n"));
        assert!(text.contains("FNumber: f/4.0\n"));
        assert!(text.contains(
            r#"["Canon", "Unknown", "Unknown", "Unknown", "Unknown", "f/4.0", "Unknown", "Unknown", "Unknown"]"#
        ));
    }

    #[test]
    fn empty_listing_says_so() {
        assert!(render_exif_listing(&ExifRecord::new()).contains("No EXIF data found."));
        assert!(render_selected_listing(&ExifRecord::new()).contains("No EXIF data found."));
    }

    #[test]
    fn full_listing_is_sorted_and_formatted() {
        let rec = record(vec![
            ("Model", ExifValue::Text("X100V".into())),
            ("DateTimeOriginal", ExifValue::Text("2023:05:10 14:30:00".into())),
        ]);
        let text = render_exif_listing(&rec);
        let date = text.find("DateTimeOriginal: 2023/05/10 14:30:00").unwrap();
        let model = text.find("Model: X100V").unwrap();
        assert!(date < model);
    }
}

// exif-footer/src/processors/footer.rs
use super::fields::format_field;
use super::metadata::ExifRecord;
use crate::core::{FooterError, FooterStyle, Result};
use ab_glyph::{Font, FontVec, PxScale};
use image::{imageops, DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::path::Path;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GREY: Rgb<u8> = Rgb([159, 159, 159]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Single line of the standard layout.
    Summary,
    Model,
    Settings,
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub role: TextRole,
    pub text: String,
    pub x: i32,
    pub y: i32,
    /// Em size in pixels.
    pub size: f32,
    pub color: Rgb<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub main: f32,
    pub camera: f32,
    pub date: f32,
}

impl FontSizes {
    pub fn for_width(width: u32) -> Self {
        let width = width as f64;
        Self {
            main: (width * 0.03).floor() as f32,
            camera: (width * 0.022).floor() as f32,
            date: (width * 0.015).floor() as f32,
        }
    }
}

/// Text placement for one photo, scaled from a layout drawn at the
/// reference width.
#[derive(Debug, Clone, PartialEq)]
pub struct FooterLayout {
    pub width_ratio: f64,
    pub fonts: FontSizes,
    pub elements: Vec<TextElement>,
}

impl FooterLayout {
    pub fn compute(
        style: FooterStyle,
        record: &ExifRecord,
        photo_width: u32,
        photo_height: u32,
        reference_width: f32,
    ) -> Self {
        let width_ratio = photo_width as f64 / reference_width as f64;
        let fonts = FontSizes::for_width(photo_width);
        let top = photo_height as i32;

        let elements = match style {
            FooterStyle::Standard => standard(record, top, width_ratio, &fonts),
            FooterStyle::BrandSpecific => brand_specific(record, top, width_ratio, &fonts),
        };

        Self {
            width_ratio,
            fonts,
            elements,
        }
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn find(&self, role: TextRole) -> Option<&TextElement> {
        self.elements.iter().find(|e| e.role == role)
    }
}

fn standard(record: &ExifRecord, top: i32, ratio: f64, fonts: &FontSizes) -> Vec<TextElement> {
    let text = format!(
        "{}  {}  {}  {}  {}",
        format_field(record, "Model"),
        format_field(record, "FocalLength"),
        format_field(record, "FNumber"),
        format_field(record, "ExposureTime"),
        format_field(record, "ISOSpeedRatings"),
    );

    vec![TextElement {
        role: TextRole::Summary,
        text,
        x: (20.0 * ratio) as i32,
        y: top + (25.0 * ratio) as i32,
        size: fonts.main,
        color: BLACK,
    }]
}

fn brand_specific(record: &ExifRecord, top: i32, ratio: f64, fonts: &FontSizes) -> Vec<TextElement> {
    let text_y = top + (110.0 * ratio) as i32;
    let text_x = (80.0 * ratio) as i32;
    let camera_x = (text_x as f64 + 1900.0 * ratio) as i32;
    let camera_y = (text_y as f64 - 12.0 * ratio) as i32;
    let date_y = (text_y as f64 + 85.0 * ratio) as i32;

    let mut elements = Vec::with_capacity(3);

    let is_apple = record.text("Make").is_some_and(|make| make.contains("Apple"));
    if is_apple {
        elements.push(TextElement {
            role: TextRole::Model,
            text: format_field(record, "Model"),
            x: text_x,
            y: text_y,
            size: fonts.main,
            color: BLACK,
        });
    }

    elements.push(TextElement {
        role: TextRole::Settings,
        text: format!(
            "{}   {}   {}   {}",
            format_field(record, "FocalLengthIn35mmFilm"),
            format_field(record, "FNumber"),
            format_field(record, "ExposureTime"),
            format_field(record, "ISOSpeedRatings"),
        ),
        x: camera_x,
        y: camera_y,
        size: fonts.camera,
        color: BLACK,
    });

    elements.push(TextElement {
        role: TextRole::Date,
        text: format_field(record, "DateTimeOriginal"),
        x: camera_x,
        y: date_y,
        size: fonts.date,
        color: GREY,
    });

    elements
}

/// Something that can put a text element onto the canvas.
pub trait Typesetter {
    fn draw(&self, canvas: &mut RgbImage, element: &TextElement);
}

pub struct FontTypesetter {
    font: FontVec,
}

impl FontTypesetter {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            FooterError::Font(format!("Failed to read font {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded font from {}", path.display());
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(data).map_err(|e| FooterError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    // ab_glyph scales by ascent-to-descent height; the layout sizes are em sizes
    fn scale_for(&self, size: f32) -> PxScale {
        match self.font.units_per_em() {
            Some(units_per_em) if units_per_em > 0.0 => {
                PxScale::from(size * self.font.height_unscaled() / units_per_em)
            }
            _ => PxScale::from(size),
        }
    }
}

impl Typesetter for FontTypesetter {
    fn draw(&self, canvas: &mut RgbImage, element: &TextElement) {
        if element.size < 1.0 || element.text.is_empty() {
            log::debug!("Skipping {:?} text, nothing to draw", element.role);
            return;
        }

        draw_text_mut(
            canvas,
            element.color,
            element.x,
            element.y,
            self.scale_for(element.size),
            &self.font,
            &element.text,
        );
    }
}

/// Photo on top, footer band directly underneath, on a white RGB canvas.
pub fn stack(photo: &DynamicImage, footer: &DynamicImage) -> RgbImage {
    let width = photo.width();
    let height = photo.height() + footer.height();
    let mut canvas = RgbImage::from_pixel(width, height, WHITE);

    imageops::replace(&mut canvas, &photo.to_rgb8(), 0, 0);
    imageops::replace(&mut canvas, &footer.to_rgb8(), 0, photo.height() as i64);

    canvas
}

pub fn draw_layout(canvas: &mut RgbImage, layout: &FooterLayout, typesetter: &dyn Typesetter) {
    for element in layout.elements() {
        typesetter.draw(canvas, element);
    }
}

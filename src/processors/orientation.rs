// exif-footer/src/processors/orientation.rs
use image::DynamicImage;

const TAG_ORIENTATION: u16 = 0x0112;
const TYPE_SHORT: u16 = 3;
const TIFF_HEADER_LEN: usize = 8;
const IFD_ENTRY_LEN: usize = 12;

/// EXIF orientation codes 1 through 8, named by the correction they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    /// Flip horizontally, then rotate 90° counter-clockwise.
    Transpose,
    /// Rotate 270° counter-clockwise (90° clockwise).
    Rotate270Ccw,
    /// Flip horizontally, then rotate 270° counter-clockwise.
    Transverse,
    Rotate90Ccw,
}

impl TryFrom<u32> for Orientation {
    type Error = u32;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Normal),
            2 => Ok(Self::FlipHorizontal),
            3 => Ok(Self::Rotate180),
            4 => Ok(Self::FlipVertical),
            5 => Ok(Self::Transpose),
            6 => Ok(Self::Rotate270Ccw),
            7 => Ok(Self::Transverse),
            8 => Ok(Self::Rotate90Ccw),
            other => Err(other),
        }
    }
}

impl Orientation {
    pub fn code(self) -> u32 {
        match self {
            Self::Normal => 1,
            Self::FlipHorizontal => 2,
            Self::Rotate180 => 3,
            Self::FlipVertical => 4,
            Self::Transpose => 5,
            Self::Rotate270Ccw => 6,
            Self::Transverse => 7,
            Self::Rotate90Ccw => 8,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Self::Normal
    }

    // `DynamicImage::rotate90` turns clockwise, so a counter-clockwise
    // quarter turn is `rotate270` and vice versa.
    pub fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            Self::Normal => image,
            Self::FlipHorizontal => image.fliph(),
            Self::Rotate180 => image.rotate180(),
            Self::FlipVertical => image.flipv(),
            Self::Transpose => image.fliph().rotate270(),
            Self::Rotate270Ccw => image.rotate90(),
            Self::Transverse => image.fliph().rotate90(),
            Self::Rotate90Ccw => image.rotate270(),
        }
    }
}

/// Applies the orientation code, if any. Returns the upright image and the
/// orientation that was honoured; an unusable code leaves the image as is.
pub fn correct_orientation(
    image: DynamicImage,
    code: Option<u32>,
) -> (DynamicImage, Option<Orientation>) {
    let Some(code) = code else {
        return (image, None);
    };

    match Orientation::try_from(code) {
        Ok(orientation) => {
            if !orientation.is_identity() {
                log::debug!("Applying EXIF orientation {} ({:?})", code, orientation);
            }
            (orientation.apply(image), Some(orientation))
        }
        Err(code) => {
            log::warn!("Ignoring invalid EXIF orientation value {}", code);
            (image, None)
        }
    }
}

/// Rewrites the IFD0 Orientation entry of a TIFF-structured EXIF payload to
/// 1 (normal). Returns whether an entry was found and patched.
pub fn reset_orientation(tiff: &mut [u8]) -> bool {
    let big_endian = match tiff.get(0..2) {
        Some(b"II") => false,
        Some(b"MM") => true,
        _ => return false,
    };
    let read_u16 = |data: &[u8], at: usize| -> Option<u16> {
        let bytes = [*data.get(at)?, *data.get(at + 1)?];
        Some(if big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    };
    let read_u32 = |data: &[u8], at: usize| -> Option<u32> {
        let bytes = [*data.get(at)?, *data.get(at + 1)?, *data.get(at + 2)?, *data.get(at + 3)?];
        Some(if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    };

    if tiff.len() < TIFF_HEADER_LEN {
        return false;
    }
    let Some(ifd) = read_u32(tiff, 4).map(|v| v as usize) else {
        return false;
    };
    let Some(count) = read_u16(tiff, ifd) else {
        return false;
    };

    for i in 0..count as usize {
        let entry = ifd + 2 + i * IFD_ENTRY_LEN;
        let (Some(tag), Some(kind)) = (read_u16(tiff, entry), read_u16(tiff, entry + 2)) else {
            return false;
        };
        if tag != TAG_ORIENTATION {
            continue;
        }
        if kind != TYPE_SHORT || entry + IFD_ENTRY_LEN > tiff.len() {
            return false;
        }

        let value = if big_endian { 1u16.to_be_bytes() } else { 1u16.to_le_bytes() };
        tiff[entry + 8..entry + 10].copy_from_slice(&value);
        return true;
    }

    false
}

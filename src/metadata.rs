//! EXIF metadata extraction.
//!
//! Each photo can carry two pieces of embedded metadata this tool cares
//! about:
//!
//! - **Capture time**: `DateTimeOriginal` (when the shutter fired), with
//!   `DateTime` as a fallback — some editors rewrite only the latter.
//! - **Orientation**: the 1–8 code describing how the sensor data must be
//!   rotated/mirrored for upright display.
//!
//! ## Absence is not an error
//!
//! Screenshots, exported web images, and stripped files have no EXIF at
//! all; partially written EXIF is common too. Extraction therefore never
//! fails: [`read_metadata`] returns a [`PhotoMeta`] of `Option`s and maps
//! every parse problem to absence. Downstream code decides what absence
//! means (mtime fallback for the timestamp, upright for the orientation).
//!
//! The date fields are kept as raw strings here; interpretation lives in
//! [`crate::timestamp`] so the fallback chain is testable without an EXIF
//! container.

use exif::{In, Tag, Value};
use std::io::Cursor;

/// Embedded metadata relevant to stamping. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoMeta {
    /// Raw `DateTimeOriginal` string, e.g. `"2023:11:02 08:15:30"`.
    pub date_time_original: Option<String>,
    /// Raw `DateTime` string (file-level modification time in EXIF terms).
    pub date_time: Option<String>,
    /// Raw orientation code.
    pub orientation: Option<u16>,
}

impl PhotoMeta {
    /// The embedded capture-time candidates in priority order.
    pub fn capture_candidates(&self) -> [Option<&str>; 2] {
        [
            self.date_time_original.as_deref(),
            self.date_time.as_deref(),
        ]
    }
}

/// Read EXIF metadata from an image byte buffer.
///
/// Missing or malformed EXIF yields a default (all-`None`) `PhotoMeta`.
pub fn read_metadata(bytes: &[u8]) -> PhotoMeta {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return PhotoMeta::default();
    };

    PhotoMeta {
        date_time_original: ascii_field(&exif, Tag::DateTimeOriginal),
        date_time: ascii_field(&exif, Tag::DateTime),
        orientation: uint_field(&exif, Tag::Orientation),
    }
}

/// Extract an ASCII tag as a trimmed, non-empty string.
fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(segments) => segments
            .first()
            .map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_matches(['\0', ' ', '"'])
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Extract an unsigned integer tag.
fn uint_field(exif: &exif::Exif, tag: Tag) -> Option<u16> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    field.value.get_uint(0).map(|v| v as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_yield_default() {
        assert_eq!(read_metadata(b"not an image"), PhotoMeta::default());
        assert_eq!(read_metadata(&[]), PhotoMeta::default());
    }

    #[test]
    fn plain_png_has_no_metadata() {
        // A valid image without an EXIF container still reads as absent.
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();

        assert_eq!(read_metadata(&bytes), PhotoMeta::default());
    }

    #[test]
    fn capture_candidates_priority_order() {
        let meta = PhotoMeta {
            date_time_original: Some("2023:11:02 08:15:30".into()),
            date_time: Some("2024:01:01 00:00:00".into()),
            orientation: None,
        };
        assert_eq!(
            meta.capture_candidates(),
            [Some("2023:11:02 08:15:30"), Some("2024:01:01 00:00:00")]
        );
    }
}

//! Output format selection, naming, and in-memory encoding.
//!
//! An explicit `--format png|jpeg` choice always wins. Under `auto` the
//! source keeps its format when that format is one we encode (PNG, JPEG);
//! everything else becomes PNG, since an arbitrary source format is not
//! assumed re-encodable losslessly to its original type. JPEG output is
//! always at maximum quality — the input already paid its generation loss.
//!
//! Output names follow the fixed convention: strip the original extension,
//! append `_stamped`, append the extension of the chosen encoding.
//!
//! ```text
//! IMG_001.HEIC  --format png  →  IMG_001_stamped.png
//! holiday.jpeg  auto          →  holiday_stamped.jpg
//! ```

use crate::config::FormatChoice;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// JPEG output quality. Pinned at maximum; the stamp should not cost the
/// photo a second generation of visible loss.
pub const JPEG_QUALITY: u8 = 100;

/// The output encodings this tool produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Png,
    Jpeg,
}

impl OutputEncoding {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Choose the output encoding from the source's declared media type and
/// the user's format choice.
pub fn select_output(media_type: &str, choice: FormatChoice) -> OutputEncoding {
    match choice {
        FormatChoice::Png => OutputEncoding::Png,
        FormatChoice::Jpeg => OutputEncoding::Jpeg,
        FormatChoice::Auto => {
            if is_jpeg(media_type) {
                OutputEncoding::Jpeg
            } else {
                // PNG for PNG sources, and PNG as the safe fallback for
                // everything else (WebP, TIFF, HEIC, unknown).
                OutputEncoding::Png
            }
        }
    }
}

fn is_jpeg(media_type: &str) -> bool {
    media_type.eq_ignore_ascii_case("image/jpeg") || media_type.eq_ignore_ascii_case("image/jpg")
}

/// Declared media type for a path, derived from its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "heic" | "heif" => "image/heic",
        "avif" => "image/avif",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Output file name for a source name: extension stripped, `_stamped`
/// marker appended, new extension per the encoding.
pub fn output_name(source_name: &str, encoding: OutputEncoding) -> String {
    let base = match source_name.rfind('.') {
        // A leading dot is a hidden-file prefix, not an extension.
        Some(pos) if pos > 0 => &source_name[..pos],
        _ => source_name,
    };
    format!("{}_stamped.{}", base, encoding.extension())
}

/// Encode a rendered canvas into the chosen format, in memory.
///
/// JPEG has no alpha channel, so the canvas is flattened to RGB first.
pub fn encode(canvas: &RgbaImage, encoding: OutputEncoding) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    match encoding {
        OutputEncoding::Png => {
            PngEncoder::new(Cursor::new(&mut bytes)).write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        OutputEncoding::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(canvas.clone()).into_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut bytes), JPEG_QUALITY).write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
    }
    Ok(bytes)
}

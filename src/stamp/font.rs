//! Stamp font loading.
//!
//! The default face is DejaVu Sans Mono, embedded in the binary so the
//! tool works with no files installed — a monospace face is what gives the
//! stamp its analog-camera date-stamp look. A user-supplied TTF/OTF path
//! overrides it.

use ab_glyph::FontArc;
use std::path::Path;
use thiserror::Error;

static DEFAULT_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font data: {0}")]
    Parse(#[from] ab_glyph::InvalidFont),
}

/// Load the stamp font: the given TTF/OTF path, or the embedded
/// monospace face when none is given.
pub fn load_font(path: Option<&Path>) -> Result<FontArc, FontError> {
    match path {
        Some(path) => {
            let data = std::fs::read(path)?;
            Ok(FontArc::try_from_vec(data)?)
        }
        None => Ok(FontArc::try_from_slice(DEFAULT_FONT)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_glyph::Font;

    #[test]
    fn embedded_font_loads() {
        let font = load_font(None).unwrap();
        // The embedded face must cover the stamp alphabet.
        for ch in "0123456789:/- ".chars() {
            assert_ne!(font.glyph_id(ch).0, 0, "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn missing_font_file_errors() {
        let result = load_font(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(result, Err(FontError::Io(_))));
    }

    #[test]
    fn non_font_file_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("not-a-font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(load_font(Some(&path)), Err(FontError::Parse(_))));
    }
}

//! Timestamp selection and formatting.
//!
//! ## Selection
//!
//! The stamped point-in-time is chosen by [`select_timestamp`] according to
//! the configured [`TimeSource`]. The first available value wins:
//!
//! - **now**: the wall clock (passed in by the caller, so selection stays
//!   a pure function)
//! - **modified**: the file's modification time
//! - **capture**: embedded `DateTimeOriginal` → embedded `DateTime` →
//!   file modification time
//!
//! Selection always produces a value; there is no error path. An
//! unparseable embedded date is the same as an absent one.
//!
//! ## Parsing
//!
//! EXIF dates are nominally `YYYY:MM:DD HH:MM:SS`, but dash separators and
//! missing seconds both occur in the wild (phone firmwares and editing
//! tools disagree). [`parse_exif_datetime`] normalizes dashes to colons and
//! then tries the format variants longest-first, ignoring trailing
//! subsecond noise.
//!
//! ## Formatting
//!
//! Three fixed layouts, all zero-padded, no timezone conversion — the
//! naive local field values are rendered as-is:
//!
//! ```text
//! mdy   03/05/24 14:07
//! dmy   05/03/24 14:07
//! iso   2024-03-05 14:07
//! ```

use crate::config::{StampStyle, TimeSource};
use crate::metadata::PhotoMeta;
use chrono::{NaiveDateTime, Timelike};

/// Pick the point-in-time to stamp. Never fails.
pub fn select_timestamp(
    source: TimeSource,
    now: NaiveDateTime,
    modified: NaiveDateTime,
    meta: &PhotoMeta,
) -> NaiveDateTime {
    match source {
        TimeSource::Now => now,
        TimeSource::Modified => modified,
        TimeSource::Capture => meta
            .capture_candidates()
            .iter()
            .flatten()
            .find_map(|raw| parse_exif_datetime(raw))
            .unwrap_or(modified),
    }
}

/// Parse an embedded date string of the shape `YYYY[:-]MM[:-]DD HH:MM[:SS]`.
///
/// Seconds default to 0 when missing; trailing fractional seconds are
/// accepted and discarded.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let normalized = raw.trim().replace('-', ":");

    if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, "%Y:%m:%d %H:%M:%S%.f") {
        return dt.with_nanosecond(0);
    }
    // Prefix matches, for strings with trailing content the formats above
    // don't consume (e.g. a timezone suffix).
    if let Some(prefix) = normalized.get(..19) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(prefix, "%Y:%m:%d %H:%M:%S") {
            return Some(dt);
        }
    }
    if let Some(prefix) = normalized.get(..16) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(prefix, "%Y:%m:%d %H:%M") {
            return Some(dt);
        }
    }
    None
}

/// Render the stamp text for a point-in-time in the given style.
pub fn format_stamp(dt: NaiveDateTime, style: StampStyle) -> String {
    let pattern = match style {
        StampStyle::Mdy => "%m/%d/%y %H:%M",
        StampStyle::Dmy => "%d/%m/%y %H:%M",
        StampStyle::Iso => "%Y-%m-%d %H:%M",
    };
    dt.format(pattern).to_string()
}

//! Run configuration.
//!
//! Handles loading and validating `datemark.toml`, and resolving the
//! effective settings for a run. Settings cascade from least to most
//! specific:
//!
//! ```text
//! stock defaults  →  datemark.toml (optional)  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [timestamp]
//! source = "capture"        # capture | modified | now
//! style = "mdy"             # mdy | dmy | iso
//!
//! [stamp]
//! size_percent = 4.5        # font size, % of canvas width (1-12)
//! margin_percent = 2.0      # margin, % of canvas width (0-10)
//! color = "#ff8a00"         # stamp fill color
//! # font = "camera.ttf"     # TTF/OTF override for the built-in monospace face
//!
//! [output]
//! format = "auto"           # auto | png | jpeg
//! dir = "stamped"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only switch the stamp style
//! [timestamp]
//! style = "iso"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! ## Clamping
//!
//! The stamp percentages are validated on resolution, not on load:
//! out-of-range values clamp to their bounds, and non-finite values fall
//! back to the documented defaults. An unparseable color falls back to the
//! default orange. A typo'd config therefore degrades to a usable stamp
//! instead of aborting a long batch.

use clap::ValueEnum;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Where the stamped point-in-time comes from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TimeSource {
    /// Embedded capture time from EXIF, falling back to file mtime.
    #[default]
    Capture,
    /// The file's modification time.
    Modified,
    /// The current wall-clock time.
    Now,
}

/// Stamp text layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum StampStyle {
    /// `MM/DD/YY HH:mm`
    #[default]
    Mdy,
    /// `DD/MM/YY HH:mm`
    Dmy,
    /// `YYYY-MM-DD HH:mm`
    Iso,
}

/// Output encoding choice.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FormatChoice {
    /// Match the source format; unknown source types fall back to PNG.
    #[default]
    Auto,
    /// Always PNG.
    Png,
    /// Always JPEG at maximum quality.
    Jpeg,
}

pub const DEFAULT_SIZE_PERCENT: f32 = 4.5;
pub const DEFAULT_MARGIN_PERCENT: f32 = 2.0;
pub const DEFAULT_COLOR: &str = "#ff8a00";
pub const DEFAULT_OUTPUT_DIR: &str = "stamped";

pub const SIZE_PERCENT_RANGE: (f32, f32) = (1.0, 12.0);
pub const MARGIN_PERCENT_RANGE: (f32, f32) = (0.0, 10.0);

/// Run configuration loaded from `datemark.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub timestamp: TimestampConfig,
    pub stamp: StampConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimestampConfig {
    pub source: TimeSource,
    pub style: StampStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampConfig {
    /// Font size as a percentage of canvas width.
    pub size_percent: f32,
    /// Margin as a percentage of canvas width.
    pub margin_percent: f32,
    /// Stamp fill color, `#rgb` or `#rrggbb`.
    pub color: String,
    /// Optional TTF/OTF path overriding the embedded monospace face.
    pub font: Option<PathBuf>,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            size_percent: DEFAULT_SIZE_PERCENT,
            margin_percent: DEFAULT_MARGIN_PERCENT,
            color: DEFAULT_COLOR.to_string(),
            font: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: FormatChoice,
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: FormatChoice::default(),
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl RunConfig {
    /// Load a config file, rejecting unknown keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from an explicit path, or from `datemark.toml` in the current
    /// directory if one exists, or fall back to stock defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new("datemark.toml");
                if local.exists() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Resolved stamp appearance with percentages validated and the color
/// parsed. This is what the compositor consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StampAppearance {
    pub size_percent: f32,
    pub margin_percent: f32,
    pub color: Rgba<u8>,
}

impl Default for StampAppearance {
    fn default() -> Self {
        Self {
            size_percent: DEFAULT_SIZE_PERCENT,
            margin_percent: DEFAULT_MARGIN_PERCENT,
            color: parse_color(DEFAULT_COLOR).expect("default color parses"),
        }
    }
}

impl StampAppearance {
    /// Resolve raw settings into a valid appearance: clamp the
    /// percentages, defaulting non-finite values, and parse the color.
    pub fn resolve(size_percent: f32, margin_percent: f32, color: &str) -> Self {
        Self {
            size_percent: clamp_or_default(size_percent, SIZE_PERCENT_RANGE, DEFAULT_SIZE_PERCENT),
            margin_percent: clamp_or_default(
                margin_percent,
                MARGIN_PERCENT_RANGE,
                DEFAULT_MARGIN_PERCENT,
            ),
            color: parse_color(color)
                .unwrap_or_else(|| parse_color(DEFAULT_COLOR).expect("default color parses")),
        }
    }
}

fn clamp_or_default(value: f32, (min, max): (f32, f32), default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

/// Parse a `#rgb` or `#rrggbb` hex color. Returns `None` for anything else.
pub fn parse_color(s: &str) -> Option<Rgba<u8>> {
    let hex = s.trim().strip_prefix('#')?;
    match hex.len() {
        3 => {
            let mut channels = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                channels[i] = v * 17;
            }
            Some(Rgba([channels[0], channels[1], channels[2], 255]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba([r, g, b, 255]))
        }
        _ => None,
    }
}

/// A fully documented stock config, suitable for `datemark gen-config`.
pub fn stock_config_toml() -> String {
    format!(
        r##"# datemark configuration
# Place this file as datemark.toml next to where you run datemark,
# or point at it with --config. All options are optional; the values
# below are the stock defaults. Command-line flags override this file.

[timestamp]
# Where the stamped time comes from:
#   capture  - EXIF capture time, falling back to the file's mtime
#   modified - the file's mtime
#   now      - the current wall-clock time
source = "capture"

# Stamp text layout:
#   mdy - MM/DD/YY HH:mm
#   dmy - DD/MM/YY HH:mm
#   iso - YYYY-MM-DD HH:mm
style = "mdy"

[stamp]
# Font size as a percentage of the output image width ({size_min}-{size_max}).
size_percent = {size}

# Margin from the bottom-right corner, percentage of width ({margin_min}-{margin_max}).
margin_percent = {margin}

# Stamp fill color, "#rgb" or "#rrggbb".
color = "{color}"

# Uncomment to override the built-in monospace face with your own TTF/OTF.
# font = "camera.ttf"

[output]
# Output encoding:
#   auto - PNG stays PNG, JPEG stays JPEG, anything else becomes PNG
#   png  - always PNG
#   jpeg - always JPEG at maximum quality
format = "auto"

# Directory for stamped images (created if missing).
dir = "{dir}"
"##,
        size = DEFAULT_SIZE_PERCENT,
        size_min = SIZE_PERCENT_RANGE.0,
        size_max = SIZE_PERCENT_RANGE.1,
        margin = DEFAULT_MARGIN_PERCENT,
        margin_min = MARGIN_PERCENT_RANGE.0,
        margin_max = MARGIN_PERCENT_RANGE.1,
        color = DEFAULT_COLOR,
        dir = DEFAULT_OUTPUT_DIR,
    )
}

//! # datemark
//!
//! Batch timestamp stamping for photos. Point it at files or directories
//! and it overlays each image with a date stamp — the way compact cameras
//! used to burn one into the corner — derived from EXIF capture time, file
//! modification time, or the current clock.
//!
//! # Architecture: A Per-File Pipeline
//!
//! Every selected file flows left to right through the same stages:
//!
//! ```text
//! bytes ─→ metadata ─→ timestamp ─→ decode ─→ orient ─→ stamp ─→ encode ─→ output
//!           (EXIF)     (select +              (upright  (text             (named
//!                       format)                canvas)   layers)           bytes)
//! ```
//!
//! Files are processed strictly one at a time, in selection order; the
//! batch either completes or stops at the first file that cannot be
//! decoded or encoded. Completed batches can additionally be exported as
//! one ZIP archive.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `datemark.toml` loading, defaults, clamping, the settings cascade |
//! | [`metadata`] | EXIF extraction that never fails — absence is a value, not an error |
//! | [`timestamp`] | Timestamp selection (capture/modified/now) and the three stamp layouts |
//! | [`orient`] | EXIF orientation codes 1–8 as a pure layout value + lossless pixel ops |
//! | [`stamp`] | Compositor: upright canvas, stamp geometry, outline/shadow/fill text |
//! | [`format`] | Output encoding selection, `_stamped` naming, in-memory encode |
//! | [`pipeline`] | Batch orchestration: selection, run state machine, progress events |
//! | [`archive`] | ZIP export of a completed batch |
//! | [`output`] | CLI display formatting (pure `format_*` + `print_*` wrappers) |
//!
//! # Design Decisions
//!
//! ## Orientation As A Value
//!
//! Orientation correction is computed first as an immutable
//! [`orient::OrientedLayout`] — upright canvas dimensions plus the affine
//! transform from sensor space — and only then applied to pixels. There is
//! no mutable drawing-context state to reset between "draw the photo" and
//! "draw the text": the stamp is always measured and placed against the
//! upright canvas, so a rotated portrait gets its stamp in the visual
//! bottom-right corner, not the sensor's.
//!
//! ## Metadata Absence Is Not An Error
//!
//! Stripped, partial, or malformed EXIF is everyday input, so
//! [`metadata::read_metadata`] returns `Option`s instead of failing, and
//! the timestamp selector falls back (capture → embedded modification time
//! → file mtime) without ever aborting a batch. Decode and encode failures,
//! by contrast, are hard stops — silently skipping a photo the user
//! selected would be worse than stopping.
//!
//! ## Pure Rust Imaging
//!
//! Decoding, rotation, text rasterization, and encoding all run in-process
//! via the `image` and `ab_glyph` crates — no ImageMagick, no system font
//! lookup. The default stamp face (DejaVu Sans Mono) is embedded in the
//! binary, so a downloaded executable stamps photos with no files
//! installed.
//!
//! ## One File At A Time
//!
//! Batches run strictly sequentially. Stamping is I/O-and-encode bound on
//! exactly the machine classes this tool targets, and sequential runs make
//! the failure contract trivial: outputs are produced in selection order,
//! and a failure report ("failed at 3/120") points at one file.

pub mod archive;
pub mod config;
pub mod format;
pub mod metadata;
pub mod orient;
pub mod output;
pub mod pipeline;
pub mod stamp;
pub mod timestamp;

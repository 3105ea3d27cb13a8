//! Batch orchestration.
//!
//! Takes the resolved selection and runs each file through the per-file
//! pipeline, strictly in order, one at a time:
//!
//! ```text
//! read bytes → EXIF → pick timestamp → format text
//!            → decode → orient + stamp → encode → Output
//! ```
//!
//! ## Run lifecycle
//!
//! The batch lifecycle is an explicit value, not ambient state:
//!
//! ```text
//! Idle → Selected → Processing → Done
//!                              ↘ Failed (first hard error, run aborted)
//! ```
//!
//! [`run_batch`] returns the final [`RunState`] together with the
//! accumulated [`Batch`]; callers decide what a `Failed` state means for
//! the outputs produced before the failure (they are written, but the
//! batch is not archived). Progress is reported as [`ProgressEvent`]s over
//! an optional channel so display stays out of the pipeline.
//!
//! ## Error policy
//!
//! Metadata problems are not errors — they read as absent metadata and the
//! timestamp falls back (see [`crate::metadata`]). Decode and encode
//! failures are hard errors: the run stops at that file and reports how
//! far it got. There are no retries.

use crate::config::{FormatChoice, StampAppearance, StampStyle, TimeSource};
use crate::format::{encode, media_type_for_path, output_name, select_output};
use crate::metadata::read_metadata;
use crate::orient::OrientationCode;
use crate::stamp::render_stamped;
use crate::timestamp::{format_stamp, select_timestamp};
use ab_glyph::FontArc;
use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions collected when a directory is part of the selection.
/// Explicitly named files bypass this list — decode decides.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("source not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("failed to decode {name}: {source}")]
    Decode {
        name: String,
        source: image::ImageError,
    },
    #[error("failed to encode output for {name}: {source}")]
    Encode {
        name: String,
        source: image::ImageError,
    },
}

/// One selected input file. Bytes are read when the file is processed,
/// not at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Display name (final path component).
    pub name: String,
    /// Declared media type, derived from the extension.
    pub media_type: &'static str,
    /// Filesystem modification time, as naive local time.
    pub modified: NaiveDateTime,
}

/// One stamped result. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The ordered outputs of one run, matching the selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub outputs: Vec<Output>,
}

/// Batch lifecycle as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Selected {
        total: usize,
    },
    Processing {
        done: usize,
        total: usize,
    },
    Done {
        total: usize,
    },
    Failed {
        /// 1-based index of the file that failed.
        index: usize,
        total: usize,
        message: String,
    },
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    /// A file finished; `index` is 1-based.
    Stamped {
        index: usize,
        total: usize,
        source: String,
        output: String,
    },
    Finished {
        total: usize,
    },
    Failed {
        index: usize,
        total: usize,
        message: String,
    },
}

/// Everything a run needs besides the selection.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub time_source: TimeSource,
    pub style: StampStyle,
    pub format: FormatChoice,
    pub appearance: StampAppearance,
    pub font: FontArc,
}

/// Result of a run: terminal state plus whatever outputs were produced.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub state: RunState,
    pub batch: Batch,
}

/// Expand CLI path arguments into the ordered selection.
///
/// Argument order is preserved. A file argument is taken as-is; a
/// directory argument contributes its image files in lexicographic order
/// (subdirectories too when `recursive`).
pub fn collect_sources(
    paths: &[PathBuf],
    recursive: bool,
) -> Result<Vec<SourceFile>, PipelineError> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(PipelineError::SourceNotFound(path.clone()));
        }
        if path.is_dir() {
            let max_depth = if recursive { usize::MAX } else { 1 };
            let mut entries: Vec<PathBuf> = WalkDir::new(path)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| has_supported_extension(p))
                .collect();
            entries.sort();
            for entry in entries {
                sources.push(source_file(&entry)?);
            }
        } else {
            sources.push(source_file(path)?);
        }
    }
    Ok(sources)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

fn source_file(path: &Path) -> Result<SourceFile, PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(io_err)?;
    Ok(SourceFile {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        media_type: media_type_for_path(path),
        modified: DateTime::<Local>::from(modified).naive_local(),
    })
}

/// Run the full batch. Never panics or errors at the top level; failures
/// are encoded in the returned [`RunState`].
pub fn run_batch(
    files: &[SourceFile],
    opts: &RunOptions,
    progress: Option<&Sender<ProgressEvent>>,
) -> BatchRun {
    let total = files.len();
    let send = |event: ProgressEvent| {
        if let Some(tx) = progress {
            let _ = tx.send(event);
        }
    };

    send(ProgressEvent::Started { total });
    let mut outputs = Vec::with_capacity(total);

    for (i, file) in files.iter().enumerate() {
        match stamp_one(file, opts, Local::now().naive_local()) {
            Ok(output) => {
                send(ProgressEvent::Stamped {
                    index: i + 1,
                    total,
                    source: file.name.clone(),
                    output: output.name.clone(),
                });
                outputs.push(output);
            }
            Err(err) => {
                let message = err.to_string();
                send(ProgressEvent::Failed {
                    index: i + 1,
                    total,
                    message: message.clone(),
                });
                return BatchRun {
                    state: RunState::Failed {
                        index: i + 1,
                        total,
                        message,
                    },
                    batch: Batch { outputs },
                };
            }
        }
    }

    send(ProgressEvent::Finished { total });
    BatchRun {
        state: RunState::Done { total },
        batch: Batch { outputs },
    }
}

/// The per-file pipeline. `now` is injected so the `now` time source stays
/// testable.
pub fn stamp_one(
    file: &SourceFile,
    opts: &RunOptions,
    now: NaiveDateTime,
) -> Result<Output, PipelineError> {
    let bytes = fs::read(&file.path).map_err(|source| PipelineError::Io {
        path: file.path.clone(),
        source,
    })?;

    // Metadata failures read as absence; the timestamp falls back.
    let meta = read_metadata(&bytes);
    let orientation = OrientationCode::from_exif(meta.orientation);
    let picked = select_timestamp(opts.time_source, now, file.modified, &meta);
    let stamp_text = format_stamp(picked, opts.style);

    let bitmap = image::load_from_memory(&bytes).map_err(|source| PipelineError::Decode {
        name: file.name.clone(),
        source,
    })?;
    drop(bytes);

    let canvas = render_stamped(bitmap, orientation, &stamp_text, &opts.appearance, &opts.font);

    let encoding = select_output(file.media_type, opts.format);
    let encoded = encode(&canvas, encoding).map_err(|source| PipelineError::Encode {
        name: file.name.clone(),
        source,
    })?;

    Ok(Output {
        name: output_name(&file.name, encoding),
        bytes: encoded,
    })
}

/// Write every output into `dir` (created if missing), returning the
/// written paths in batch order.
pub fn write_batch(batch: &Batch, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(batch.outputs.len());
    for output in &batch.outputs {
        let path = dir.join(&output.name);
        fs::write(&path, &output.bytes)?;
        written.push(path);
    }
    Ok(written)
}

//! CLI output formatting.
//!
//! Each display has a `format_*` function returning lines and a thin
//! `print_*` wrapper that writes to stdout. Format functions are pure —
//! no I/O, no side effects — so tests assert on exact strings.
//!
//! ## Stamp run
//!
//! ```text
//! Processing 3 file(s)
//! 001 IMG_0001.jpg → IMG_0001_stamped.jpg
//! 002 IMG_0002.jpg → IMG_0002_stamped.jpg
//! 003 scan.png → scan_stamped.png
//! Done. Processed 3 file(s).
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 IMG_0001.jpg
//!     Timestamp: 2023-11-02 08:15 (capture)
//!     Output: IMG_0001_stamped.jpg
//! ```

use crate::pipeline::{ProgressEvent, RunState};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Lines for a single progress event.
pub fn format_progress_event(event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::Started { total } => {
            vec![format!("Processing {total} file(s)")]
        }
        ProgressEvent::Stamped {
            index,
            source,
            output,
            ..
        } => {
            vec![format!("{} {} → {}", format_index(*index), source, output)]
        }
        ProgressEvent::Finished { .. } => Vec::new(),
        ProgressEvent::Failed { .. } => Vec::new(),
    }
}

/// The terminal status line for a run.
pub fn format_run_state(state: &RunState) -> String {
    match state {
        RunState::Idle => "Nothing to do.".to_string(),
        RunState::Selected { total } => format!("Selected {total} file(s)."),
        RunState::Processing { done, total } => format!("Processing {}/{total}…", done + 1),
        RunState::Done { total } => format!("Done. Processed {total} file(s)."),
        RunState::Failed {
            index,
            total,
            message,
        } => format!("Error: {message} (failed at {index}/{total})"),
    }
}

/// Check (dry-run) lines for one file.
pub fn format_check_entry(
    index: usize,
    name: &str,
    dimensions: Option<(u32, u32)>,
    orientation_code: u16,
    stamp_text: &str,
    source_label: &str,
    output_name: &str,
) -> Vec<String> {
    let mut lines = vec![match dimensions {
        Some((w, h)) => format!("{} {} ({w}x{h})", format_index(index), name),
        None => format!("{} {}", format_index(index), name),
    }];
    if orientation_code != 1 {
        lines.push(format!("    Orientation: {orientation_code}"));
    }
    lines.push(format!("    Timestamp: {stamp_text} ({source_label})"));
    lines.push(format!("    Output: {output_name}"));
    lines
}

pub fn print_progress_event(event: &ProgressEvent) {
    for line in format_progress_event(event) {
        println!("{line}");
    }
}

pub fn print_run_state(state: &RunState) {
    println!("{}", format_run_state(state));
}

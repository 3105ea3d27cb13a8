//! Batch archive export.
//!
//! Bundles every output of a completed run into a single ZIP so a batch
//! can be handed off as one file. Entries are stored under their output
//! names, in batch order. The archive is built fully in memory — outputs
//! already live there, and batches are photo-sized, not backup-sized.
//!
//! An archive failure invalidates only the export: the individual outputs
//! on disk remain valid and the export can be retried.

use crate::pipeline::Batch;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Fixed name for the exported archive.
pub const ARCHIVE_NAME: &str = "stamped_images.zip";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a ZIP archive containing every output in the batch, in order.
pub fn build_archive(batch: &Batch) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for output in &batch.outputs {
        writer.start_file(output.name.as_str(), options)?;
        writer.write_all(&output.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Output;

    fn sample_batch() -> Batch {
        Batch {
            outputs: vec![
                Output {
                    name: "one_stamped.png".into(),
                    bytes: b"png bytes".to_vec(),
                },
                Output {
                    name: "two_stamped.jpg".into(),
                    bytes: b"jpeg bytes".to_vec(),
                },
            ],
        }
    }

    #[test]
    fn archive_contains_all_entries_in_batch_order() {
        let bytes = build_archive(&sample_batch()).unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "one_stamped.png");
        assert_eq!(zip.by_index(1).unwrap().name(), "two_stamped.jpg");
    }

    #[test]
    fn archive_entries_round_trip_bytes() {
        let bytes = build_archive(&sample_batch()).unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut zip.by_name("one_stamped.png").unwrap(), &mut content)
            .unwrap();
        assert_eq!(content, b"png bytes");
    }

    #[test]
    fn empty_batch_builds_an_empty_archive() {
        let bytes = build_archive(&Batch::default()).unwrap();
        let zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 0);
    }
}

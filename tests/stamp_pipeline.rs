//! End-to-end pipeline tests over real files, including EXIF handling.
//!
//! The EXIF fixtures are built by hand: a minimal TIFF block (orientation
//! + DateTime) wrapped in a JPEG APP1 segment and spliced into a
//! synthetic JPEG right after the SOI marker. That keeps the tests
//! independent of any sample-image corpus while still exercising the real
//! EXIF parser.

use datemark::archive::build_archive;
use datemark::config::{FormatChoice, StampAppearance, StampStyle, TimeSource};
use datemark::metadata::read_metadata;
use datemark::pipeline::{self, RunOptions, RunState};
use datemark::stamp::load_font;
use image::{Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixture helpers
// =========================================================================

/// Minimal little-endian TIFF block with two IFD0 entries:
/// Orientation (0x0112) and DateTime (0x0132).
fn exif_tiff(orientation: u16, datetime: &str) -> Vec<u8> {
    let mut ascii = datetime.as_bytes().to_vec();
    ascii.push(0);
    let count = ascii.len() as u32;
    // header (8) + entry count (2) + 2 entries (24) + next-IFD offset (4)
    let data_offset: u32 = 8 + 2 + 24 + 4;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    tiff.extend_from_slice(&2u16.to_le_bytes());
    // Orientation: SHORT x1, value inline
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    // DateTime: ASCII, value at data_offset
    tiff.extend_from_slice(&0x0132u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&count.to_le_bytes());
    tiff.extend_from_slice(&data_offset.to_le_bytes());
    // no further IFDs
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&ascii);
    tiff
}

/// Encode a JPEG and splice an EXIF APP1 segment in after SOI.
fn jpeg_with_exif(img: &RgbImage, orientation: u16, datetime: &str) -> Vec<u8> {
    let mut plain = Vec::new();
    img.write_to(&mut Cursor::new(&mut plain), image::ImageFormat::Jpeg)
        .unwrap();
    assert_eq!(&plain[..2], &[0xff, 0xd8], "encoder should emit SOI first");

    let tiff = exif_tiff(orientation, datetime);
    let payload_len = (2 + 6 + tiff.len()) as u16;

    let mut out = Vec::with_capacity(plain.len() + tiff.len() + 10);
    out.extend_from_slice(&[0xff, 0xd8]);
    out.extend_from_slice(&[0xff, 0xe1]);
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&plain[2..]);
    out
}

/// Landscape test image: left half red, right half blue.
fn halves_image(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, _| {
        if x < w / 2 {
            Rgb([220, 20, 20])
        } else {
            Rgb([20, 20, 220])
        }
    })
}

fn options(source: TimeSource, format: FormatChoice) -> RunOptions {
    RunOptions {
        time_source: source,
        style: StampStyle::Iso,
        format,
        appearance: StampAppearance::default(),
        font: load_font(None).unwrap(),
    }
}

fn write_file(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).unwrap();
}

// =========================================================================
// EXIF extraction through real bytes
// =========================================================================

#[test]
fn spliced_exif_is_readable() {
    let bytes = jpeg_with_exif(&halves_image(32, 16), 6, "2023:11:02 08:15:30");
    let meta = read_metadata(&bytes);

    assert_eq!(meta.orientation, Some(6));
    assert_eq!(meta.date_time.as_deref(), Some("2023:11:02 08:15:30"));
    assert_eq!(meta.date_time_original, None);
}

// =========================================================================
// Full pipeline
// =========================================================================

#[test]
fn stamps_an_exif_rotated_jpeg_upright() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("rotated.jpg");
    // Orientation 6: camera held sideways, a quarter turn needed.
    write_file(
        &path,
        &jpeg_with_exif(&halves_image(64, 32), 6, "2023:11:02 08:15:30"),
    );

    let sources = pipeline::collect_sources(&[path], false).unwrap();
    let run = pipeline::run_batch(
        &sources,
        &options(TimeSource::Capture, FormatChoice::Auto),
        None,
    );

    assert_eq!(run.state, RunState::Done { total: 1 });
    let output = &run.batch.outputs[0];
    assert_eq!(output.name, "rotated_stamped.jpg");

    // The upright canvas swaps dimensions.
    let decoded = image::load_from_memory(&output.bytes).unwrap().into_rgb8();
    assert_eq!((decoded.width(), decoded.height()), (32, 64));

    // Rotating 90° CW puts the source's left (red) half at the top.
    let top = decoded.get_pixel(16, 2);
    let bottom_mid = decoded.get_pixel(16, 40);
    assert!(top.0[0] > top.0[2], "top should be red-ish, got {top:?}");
    assert!(
        bottom_mid.0[2] > bottom_mid.0[0],
        "lower area should be blue-ish, got {bottom_mid:?}"
    );
}

#[test]
fn rotate_180_swaps_the_halves() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("flipped.jpg");
    write_file(
        &path,
        &jpeg_with_exif(&halves_image(64, 32), 3, "2023:11:02 08:15:30"),
    );

    let sources = pipeline::collect_sources(&[path], false).unwrap();
    let run = pipeline::run_batch(
        &sources,
        &options(TimeSource::Capture, FormatChoice::Png),
        None,
    );

    let decoded = image::load_from_memory(&run.batch.outputs[0].bytes)
        .unwrap()
        .into_rgb8();
    assert_eq!((decoded.width(), decoded.height()), (64, 32));

    // Sample the top row, far from the stamp area.
    let left = decoded.get_pixel(4, 1);
    let right = decoded.get_pixel(60, 1);
    assert!(left.0[2] > left.0[0], "left should now be blue, got {left:?}");
    assert!(
        right.0[0] > right.0[2],
        "right should now be red, got {right:?}"
    );
}

#[test]
fn forced_png_renames_a_jpeg_source() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("IMG_001.jpg");
    write_file(
        &path,
        &jpeg_with_exif(&halves_image(48, 24), 1, "2024:05:01 10:00:00"),
    );

    let sources = pipeline::collect_sources(&[path], false).unwrap();
    let run = pipeline::run_batch(
        &sources,
        &options(TimeSource::Capture, FormatChoice::Png),
        None,
    );

    assert_eq!(run.batch.outputs[0].name, "IMG_001_stamped.png");
    assert!(run.batch.outputs[0].bytes.starts_with(b"\x89PNG"));
}

#[test]
fn batch_stops_at_first_failure_and_keeps_earlier_outputs() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("good.jpg");
    let bad = tmp.path().join("bad.jpg");
    write_file(
        &good,
        &jpeg_with_exif(&halves_image(32, 16), 1, "2024:05:01 10:00:00"),
    );
    write_file(&bad, b"this is no jpeg");

    let sources = pipeline::collect_sources(&[good, bad], false).unwrap();
    let run = pipeline::run_batch(
        &sources,
        &options(TimeSource::Capture, FormatChoice::Auto),
        None,
    );

    assert!(matches!(
        run.state,
        RunState::Failed {
            index: 2,
            total: 2,
            ..
        }
    ));
    assert_eq!(run.batch.outputs.len(), 1);
}

// =========================================================================
// Idempotence
// =========================================================================

#[test]
fn identical_input_and_config_produce_identical_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("same.jpg");
    write_file(
        &path,
        &jpeg_with_exif(&halves_image(40, 20), 8, "2023:11:02 08:15:30"),
    );

    let sources = pipeline::collect_sources(&[path], false).unwrap();
    let opts = options(TimeSource::Capture, FormatChoice::Png);

    let first = pipeline::run_batch(&sources, &opts, None);
    let second = pipeline::run_batch(&sources, &opts, None);

    assert_eq!(first.batch.outputs, second.batch.outputs);
}

// =========================================================================
// Archive export
// =========================================================================

#[test]
fn archive_entries_follow_selection_order() {
    let tmp = TempDir::new().unwrap();
    // Selection order deliberately not alphabetical.
    let zebra = tmp.path().join("zebra.jpg");
    let apple = tmp.path().join("apple.jpg");
    write_file(
        &zebra,
        &jpeg_with_exif(&halves_image(32, 16), 1, "2024:05:01 10:00:00"),
    );
    write_file(
        &apple,
        &jpeg_with_exif(&halves_image(32, 16), 1, "2024:05:01 10:00:00"),
    );

    let sources = pipeline::collect_sources(&[zebra, apple], false).unwrap();
    let run = pipeline::run_batch(
        &sources,
        &options(TimeSource::Capture, FormatChoice::Auto),
        None,
    );
    assert_eq!(run.state, RunState::Done { total: 2 });

    let bytes = build_archive(&run.batch).unwrap();
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(zip.len(), 2);
    assert_eq!(zip.by_index(0).unwrap().name(), "zebra_stamped.jpg");
    assert_eq!(zip.by_index(1).unwrap().name(), "apple_stamped.jpg");
}

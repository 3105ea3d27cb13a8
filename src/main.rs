use clap::{Parser, Subcommand};
use datemark::config::{FormatChoice, RunConfig, StampAppearance, StampStyle, TimeSource};
use datemark::orient::OrientationCode;
use datemark::pipeline::{RunOptions, RunState, SourceFile};
use datemark::timestamp::parse_exif_datetime;
use datemark::{archive, config, metadata, output, pipeline, stamp, timestamp};
use std::io::Cursor;
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Shared selection arguments for commands that take input paths.
#[derive(clap::Args, Clone)]
struct SelectionArgs {
    /// Image files and/or directories of images, processed in this order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Descend into subdirectories of directory arguments
    #[arg(long)]
    recursive: bool,
}

/// Stamp settings; flags override datemark.toml which overrides defaults.
#[derive(clap::Args, Clone)]
struct StampFlags {
    /// Where the stamped time comes from
    #[arg(long, value_enum)]
    timestamp_source: Option<TimeSource>,

    /// Stamp text layout
    #[arg(long, value_enum)]
    style: Option<StampStyle>,

    /// Output encoding
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Font size, % of image width (1-12)
    #[arg(long)]
    size_percent: Option<f32>,

    /// Margin from the bottom-right corner, % of image width (0-10)
    #[arg(long)]
    margin_percent: Option<f32>,

    /// Stamp fill color, "#rgb" or "#rrggbb"
    #[arg(long)]
    color: Option<String>,

    /// TTF/OTF font overriding the built-in monospace face
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "datemark")]
#[command(about = "Stamp photos with a date, the way compact cameras did")]
#[command(long_about = "\
Stamp photos with a date, the way compact cameras did

Each image is corrected to upright using its EXIF orientation, then a
timestamp is composited into the bottom-right corner: colored monospace
text with a dark outline and drop shadow.

The stamped time is chosen per file (first available wins):

  capture    EXIF DateTimeOriginal → EXIF DateTime → file mtime
  modified   file mtime
  now        the current wall-clock time

Output formats:

  auto       PNG stays PNG, JPEG stays JPEG (max quality),
             anything else becomes PNG
  png, jpeg  force one encoding for the whole batch

Outputs are named <name>_stamped.<ext> and written to the output
directory; --archive additionally bundles the batch into
stamped_images.zip.

Run 'datemark gen-config' for a documented datemark.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Output directory for stamped images
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Config file (default: ./datemark.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stamp the selected images
    Stamp {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        flags: StampFlags,

        /// Also bundle the batch into stamped_images.zip
        #[arg(long)]
        archive: bool,
    },
    /// Report what a run would do, without decoding or writing images
    Check {
        #[command(flatten)]
        selection: SelectionArgs,

        #[command(flatten)]
        flags: StampFlags,
    },
    /// Print a stock datemark.toml with all options documented
    GenConfig,
}

/// Settings for one run after the defaults → file → flags cascade.
struct Resolved {
    options: RunOptions,
    output_dir: PathBuf,
}

fn resolve(
    file_config: RunConfig,
    flags: &StampFlags,
    output_flag: Option<&PathBuf>,
) -> Result<Resolved, stamp::FontError> {
    let font_path = flags.font.clone().or(file_config.stamp.font);
    let font = stamp::load_font(font_path.as_deref())?;

    let appearance = StampAppearance::resolve(
        flags.size_percent.unwrap_or(file_config.stamp.size_percent),
        flags
            .margin_percent
            .unwrap_or(file_config.stamp.margin_percent),
        flags.color.as_deref().unwrap_or(&file_config.stamp.color),
    );

    Ok(Resolved {
        options: RunOptions {
            time_source: flags
                .timestamp_source
                .unwrap_or(file_config.timestamp.source),
            style: flags.style.unwrap_or(file_config.timestamp.style),
            format: flags.format.unwrap_or(file_config.output.format),
            appearance,
            font,
        },
        output_dir: output_flag.cloned().unwrap_or(file_config.output.dir),
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let file_config = RunConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Stamp {
            selection,
            flags,
            archive: with_archive,
        } => {
            let resolved = resolve(file_config, &flags, cli.output.as_ref())?;
            let sources = pipeline::collect_sources(&selection.paths, selection.recursive)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_progress_event(&event);
                }
            });
            let run = pipeline::run_batch(&sources, &resolved.options, Some(&tx));
            drop(tx);
            printer.join().unwrap();

            if !run.batch.outputs.is_empty() {
                pipeline::write_batch(&run.batch, &resolved.output_dir)?;
                println!(
                    "Wrote {} file(s) to {}",
                    run.batch.outputs.len(),
                    resolved.output_dir.display()
                );
            }
            output::print_run_state(&run.state);

            if let RunState::Failed { .. } = run.state {
                std::process::exit(1);
            }

            if with_archive {
                match archive::build_archive(&run.batch) {
                    Ok(bytes) => {
                        let path = resolved.output_dir.join(archive::ARCHIVE_NAME);
                        std::fs::write(&path, bytes)?;
                        println!("Archive: {}", path.display());
                    }
                    Err(err) => {
                        // Outputs on disk stay valid; only the export failed.
                        eprintln!("ZIP error: {err}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Command::Check { selection, flags } => {
            let resolved = resolve(file_config, &flags, cli.output.as_ref())?;
            let sources = pipeline::collect_sources(&selection.paths, selection.recursive)?;

            output::print_run_state(&RunState::Selected {
                total: sources.len(),
            });
            for (i, source) in sources.iter().enumerate() {
                for line in check_entry(i + 1, source, &resolved.options) {
                    println!("{line}");
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Dry-run report for one file: metadata, chosen timestamp, output name.
/// Reads only the image header, never the pixels.
fn check_entry(index: usize, source: &SourceFile, options: &RunOptions) -> Vec<String> {
    let bytes = std::fs::read(&source.path).unwrap_or_default();
    let meta = metadata::read_metadata(&bytes);
    let orientation = OrientationCode::from_exif(meta.orientation);

    let dimensions = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());

    let now = chrono::Local::now().naive_local();
    let picked = timestamp::select_timestamp(options.time_source, now, source.modified, &meta);
    let stamp_text = timestamp::format_stamp(picked, options.style);

    let source_label = match options.time_source {
        TimeSource::Now => "now",
        TimeSource::Modified => "modified",
        TimeSource::Capture => {
            let has_capture = meta
                .capture_candidates()
                .iter()
                .flatten()
                .any(|raw| parse_exif_datetime(raw).is_some());
            if has_capture { "capture" } else { "modified" }
        }
    };

    let encoding = datemark::format::select_output(source.media_type, options.format);
    let out_name = datemark::format::output_name(&source.name, encoding);

    output::format_check_entry(
        index,
        &source.name,
        dimensions,
        orientation.code(),
        &stamp_text,
        source_label,
        &out_name,
    )
}

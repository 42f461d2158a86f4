use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ploop::{Annotator, NullPreview, Preview, RunConfig, TimelapseClock, run_timelapse};

/// Assemble a directory of still images into a timestamp-annotated timelapse MP4.
///
/// Images are processed in directory-walk order; name your files so that walk
/// (or `--sort-by-name`) order matches capture order. Requires `ffmpeg` on PATH.
#[derive(Parser, Debug)]
#[command(name = "ploop", version)]
struct Cli {
    /// Directory to search (recursively) for jpg/jpeg/png/tif/tiff images.
    input_dir: PathBuf,

    /// Output MP4 path.
    out_path: PathBuf,

    /// Simulated capture time of the first frame, RFC 3339
    /// (e.g. 2024-01-01T00:00:00Z).
    start_time: String,

    /// Simulated seconds between consecutive frames.
    interval_secs: u32,

    /// Output framerate.
    #[arg(long, default_value_t = ploop::DEFAULT_FPS)]
    fps: u32,

    /// TTF font for the timestamp overlay (default: probe common system fonts).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Sort located images lexicographically by path instead of trusting walk order.
    #[arg(long, default_value_t = false)]
    sort_by_name: bool,

    /// Run without a preview window (no cancellation checkpoint).
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Per-frame cancellation poll timeout, in milliseconds.
    #[arg(long, default_value_t = 1)]
    poll_timeout_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    println!("Welcome to Ploop timelapse creator.");

    let start_time = TimelapseClock::parse_start(&cli.start_time)?;
    let mut annotator = match &cli.font {
        Some(path) => Annotator::from_font_path(path)?,
        None => Annotator::from_system()?,
    };

    let cfg = RunConfig {
        fps: cli.fps,
        sort_by_name: cli.sort_by_name,
        poll_timeout: Duration::from_millis(cli.poll_timeout_ms),
        ..RunConfig::new(&cli.input_dir, &cli.out_path, start_time, cli.interval_secs)
    };

    let mut preview = make_preview(cli.headless);
    let stats = run_timelapse(&cfg, &mut annotator, preview.as_mut())?;

    if stats.cancelled {
        println!(
            "cancelled: wrote {} of {} frames to '{}'",
            stats.encoded,
            stats.located,
            cli.out_path.display()
        );
    } else {
        println!(
            "wrote {} frames to '{}' ({} skipped)",
            stats.encoded,
            cli.out_path.display(),
            stats.skipped
        );
    }
    Ok(())
}

#[cfg(feature = "preview")]
fn make_preview(headless: bool) -> Box<dyn Preview> {
    if headless {
        Box::new(NullPreview)
    } else {
        Box::new(ploop::WindowPreview::new("ploop - current image"))
    }
}

#[cfg(not(feature = "preview"))]
fn make_preview(headless: bool) -> Box<dyn Preview> {
    if !headless {
        tracing::debug!("built without the 'preview' feature; running headless");
    }
    Box::new(NullPreview)
}

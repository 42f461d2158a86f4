use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, FixedOffset};

use crate::{
    annotate::Annotator,
    clock::TimelapseClock,
    decode::decode_frame,
    encode_ffmpeg::{EncodeConfig, VideoSink},
    error::{PloopError, PloopResult},
    locate::locate_images,
    preview::Preview,
};

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(1);

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub out_path: PathBuf,
    pub start_time: DateTime<FixedOffset>,
    /// Simulated seconds between consecutive accepted frames.
    pub interval_secs: u32,
    /// Output framerate; independent of `interval_secs`, the video plays at
    /// real-time speed regardless of how much simulated time a frame covers.
    pub fps: u32,
    /// Sort located paths lexicographically instead of trusting walk order.
    pub sort_by_name: bool,
    pub poll_timeout: Duration,
}

impl RunConfig {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        out_path: impl Into<PathBuf>,
        start_time: DateTime<FixedOffset>,
        interval_secs: u32,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            out_path: out_path.into(),
            start_time,
            interval_secs,
            fps: DEFAULT_FPS,
            sort_by_name: false,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Image paths the locator found.
    pub located: usize,
    /// Frames written to the output container.
    pub encoded: u64,
    /// Images skipped (decode failure or dimension mismatch).
    pub skipped: usize,
    pub cancelled: bool,
}

/// Run the whole timelapse assembly: locate, then one strictly sequential pass of
/// decode, annotate, preview, encode per image.
///
/// The first successfully decoded image fixes the output dimensions; the sink
/// opens right before that image is written, and each image is decoded exactly
/// once and appears exactly once in the output. A decode failure skips the image
/// entirely: no clock advance, no preview, no encoded frame. Cancellation stops
/// before the currently shown frame is written, so cancelling after M accepted
/// frames leaves a finalized file with exactly M frames; cancelling before the
/// first write produces no output file at all.
pub fn run_timelapse(
    cfg: &RunConfig,
    annotator: &mut Annotator,
    preview: &mut dyn Preview,
) -> PloopResult<RunStats> {
    let paths = locate_images(&cfg.input_dir, cfg.sort_by_name)?;
    if paths.is_empty() {
        return Err(PloopError::setup(format!(
            "no images found under '{}' (recognized extensions: jpg, jpeg, png, tif, tiff)",
            cfg.input_dir.display()
        )));
    }

    tracing::info!(
        count = paths.len(),
        out = %cfg.out_path.display(),
        "writing images to output"
    );

    let mut clock = TimelapseClock::new(cfg.start_time, cfg.interval_secs)?;
    let mut sink: Option<VideoSink> = None;
    let mut stats = RunStats {
        located: paths.len(),
        ..RunStats::default()
    };

    for path in &paths {
        let mut frame = match decode_frame(path) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(path = %path.display(), "skipping image: {e}");
                stats.skipped += 1;
                continue;
            }
        };

        if let Some(open_sink) = &sink
            && (frame.width != open_sink.width() || frame.height != open_sink.height())
        {
            tracing::warn!(
                path = %path.display(),
                width = frame.width,
                height = frame.height,
                expected_width = open_sink.width(),
                expected_height = open_sink.height(),
                "skipping image with mismatched dimensions"
            );
            stats.skipped += 1;
            continue;
        }

        annotator.annotate(&mut frame, &clock.stamp());
        preview.show(&frame)?;
        if preview.poll_cancel(cfg.poll_timeout)? {
            tracing::info!("cancelled by user");
            stats.cancelled = true;
            break;
        }

        // The sink opens only once a frame is actually about to be written, so
        // cancelling during the very first frame never leaves an empty container
        // behind. That first accepted frame fixes the output dimensions.
        if sink.is_none() {
            let enc = EncodeConfig::new(&cfg.out_path, frame.width, frame.height, cfg.fps);
            sink = Some(VideoSink::open(enc)?);
        }
        let open_sink = sink
            .as_mut()
            .ok_or_else(|| PloopError::encode("video sink not open at append (bug)"))?;

        clock.advance();
        open_sink.append(&frame)?;
        stats.encoded += 1;
    }

    match sink {
        Some(open_sink) => {
            open_sink.finish()?;
        }
        None if stats.cancelled => {}
        None => {
            return Err(PloopError::setup(format!(
                "none of the {} located images could be decoded",
                stats.located
            )));
        }
    }

    tracing::info!(
        encoded = stats.encoded,
        skipped = stats.skipped,
        cancelled = stats.cancelled,
        "run complete"
    );
    Ok(stats)
}

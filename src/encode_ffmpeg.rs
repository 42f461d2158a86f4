use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    error::{PloopError, PloopResult},
    frame::FrameRgba,
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> PloopResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PloopError::setup("encode width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(PloopError::setup("encode fps must be non-zero"));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            // We target yuv420p output for maximum player compatibility.
            return Err(PloopError::setup(format!(
                "source dimensions {}x{} are odd; yuv420p mp4 output needs even width and height",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> PloopResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Append-only MP4 sink backed by a piped `ffmpeg` subprocess.
///
/// Opened once with the dimensions of the first decoded frame; every appended
/// frame must match them exactly. Frames are written in call order at the fixed
/// output framerate. `finish` must run for the container to be playable; dropping
/// an unfinished sink closes the pipe and reaps the child so cancellation or a
/// mid-run error still finalizes the file.
pub struct VideoSink {
    cfg: EncodeConfig,
    // Option so both `finish` and the Drop reaper can take ownership.
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl VideoSink {
    pub fn open(cfg: EncodeConfig) -> PloopResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(PloopError::setup(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(PloopError::setup(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        // System `ffmpeg` binary rather than FFmpeg bindings: no native dev
        // headers or libs needed at build time.
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            PloopError::setup(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PloopError::setup("failed to open ffmpeg stdin (unexpected)"))?;

        tracing::debug!(
            out = %cfg.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            "opened video sink"
        );

        Ok(Self {
            cfg,
            child: Some(child),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.cfg.width
    }

    pub fn height(&self) -> u32 {
        self.cfg.height
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Append one frame to the container.
    pub fn append(&mut self, frame: &FrameRgba) -> PloopResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(PloopError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PloopError::encode("video sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            PloopError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        self.frames_written += 1;
        Ok(())
    }

    /// Close the input pipe and wait for ffmpeg to finalize the container.
    pub fn finish(mut self) -> PloopResult<u64> {
        drop(self.stdin.take());

        let child = self
            .child
            .take()
            .ok_or_else(|| PloopError::encode("video sink is already finalized"))?;
        let output = child
            .wait_with_output()
            .map_err(|e| PloopError::encode(format!("failed to wait for ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PloopError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(frames = self.frames_written, "video sink finalized");
        Ok(self.frames_written)
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        // `finish` already took stdin and the child on the happy path; anything
        // else is an early exit, where we still close the pipe and reap the child.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            match child.wait() {
                Ok(status) if !status.success() => {
                    tracing::warn!(%status, "ffmpeg exited abnormally during early sink teardown");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("failed to reap ffmpeg during sink teardown: {e}"),
            }
        }
    }
}

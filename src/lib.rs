#![forbid(unsafe_code)]

//! Timelapse assembly: turn a directory of periodically captured still images
//! into a fixed-framerate MP4 where every frame is stamped with its simulated
//! capture time.
//!
//! The pipeline is strictly sequential and single-pass:
//! locate -> decode -> annotate -> preview/poll-cancel -> advance clock -> encode.

pub mod annotate;
pub mod clock;
pub mod decode;
pub mod encode_ffmpeg;
pub mod error;
pub mod frame;
pub mod locate;
pub mod pipeline;
pub mod preview;

pub use annotate::Annotator;
pub use clock::TimelapseClock;
pub use decode::decode_frame;
pub use encode_ffmpeg::{EncodeConfig, VideoSink, is_ffmpeg_on_path};
pub use error::{PloopError, PloopResult};
pub use frame::FrameRgba;
pub use locate::{IMAGE_EXTENSIONS, is_image_path, locate_images};
pub use pipeline::{DEFAULT_FPS, DEFAULT_POLL_TIMEOUT, RunConfig, RunStats, run_timelapse};
pub use preview::{NullPreview, Preview};

#[cfg(feature = "preview")]
pub use preview::WindowPreview;

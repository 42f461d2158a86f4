use std::time::Duration;

use crate::{error::PloopResult, frame::FrameRgba};

/// The narrow surface the pipeline consumes: show the current frame, then poll
/// briefly for a cancel request. The poll doubles as the run's only
/// responsiveness checkpoint; it is checked once per frame, never mid-decode or
/// mid-encode.
pub trait Preview {
    fn show(&mut self, frame: &FrameRgba) -> PloopResult<()>;

    /// Block for up to `timeout` and report whether the user asked to stop.
    fn poll_cancel(&mut self, timeout: Duration) -> PloopResult<bool>;
}

/// Headless preview: shows nothing and never cancels. Used by `--headless` runs,
/// builds without the `preview` feature, and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPreview;

impl Preview for NullPreview {
    fn show(&mut self, _frame: &FrameRgba) -> PloopResult<()> {
        Ok(())
    }

    fn poll_cancel(&mut self, _timeout: Duration) -> PloopResult<bool> {
        Ok(false)
    }
}

#[cfg(feature = "preview")]
pub use window::WindowPreview;

#[cfg(feature = "preview")]
mod window {
    use std::time::Duration;

    use minifb::{KeyRepeat, Window, WindowOptions};

    use crate::{
        error::{PloopError, PloopResult},
        frame::FrameRgba,
        preview::Preview,
    };

    /// Interactive preview backed by a `minifb` window.
    ///
    /// The window is created lazily from the first shown frame's dimensions. Any
    /// key press, or closing the window, counts as a cancel request.
    pub struct WindowPreview {
        title: String,
        window: Option<Window>,
        buffer: Vec<u32>,
    }

    impl WindowPreview {
        pub fn new(title: impl Into<String>) -> Self {
            Self {
                title: title.into(),
                window: None,
                buffer: Vec::new(),
            }
        }

        fn ensure_window(&mut self, width: u32, height: u32) -> PloopResult<()> {
            if self.window.is_none() {
                let window = Window::new(
                    &self.title,
                    width as usize,
                    height as usize,
                    WindowOptions::default(),
                )
                .map_err(|e| PloopError::preview(format!("cannot open preview window: {e}")))?;
                self.window = Some(window);
            }
            Ok(())
        }
    }

    impl Preview for WindowPreview {
        fn show(&mut self, frame: &FrameRgba) -> PloopResult<()> {
            self.buffer.clear();
            self.buffer.extend(frame.data.chunks_exact(4).map(|px| {
                (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2])
            }));

            let (width, height) = (frame.width, frame.height);
            self.ensure_window(width, height)?;
            let window = self
                .window
                .as_mut()
                .ok_or_else(|| PloopError::preview("preview window vanished (bug)"))?;
            window
                .update_with_buffer(&self.buffer, width as usize, height as usize)
                .map_err(|e| PloopError::preview(format!("cannot present frame: {e}")))?;
            Ok(())
        }

        fn poll_cancel(&mut self, timeout: Duration) -> PloopResult<bool> {
            let Some(window) = self.window.as_mut() else {
                return Ok(false);
            };

            std::thread::sleep(timeout);
            window.update();

            if !window.is_open() {
                return Ok(true);
            }
            Ok(!window.get_keys_pressed(KeyRepeat::No).is_empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_preview_never_cancels() {
        let mut preview = NullPreview;
        let frame = FrameRgba::solid(4, 4, [1, 2, 3, 255]).unwrap();
        for _ in 0..10 {
            preview.show(&frame).unwrap();
            assert!(!preview.poll_cancel(Duration::from_millis(1)).unwrap());
        }
    }
}

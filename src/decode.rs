use std::path::Path;

use crate::{
    error::{PloopError, PloopResult},
    frame::FrameRgba,
};

/// Decode one still image into an RGBA8 frame.
///
/// Missing file, unsupported format, and corrupt data all surface as a
/// [`PloopError::Decode`]; the pipeline treats any of them as "skip this image",
/// never as a fatal condition.
pub fn decode_frame(path: &Path) -> PloopResult<FrameRgba> {
    let dyn_img = image::open(path)
        .map_err(|e| PloopError::decode(format!("cannot decode '{}': {e}", path.display())))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(PloopError::decode(format!(
            "'{}' decoded to a zero-area image",
            path.display()
        )));
    }
    FrameRgba::new(width, height, rgba.into_raw())
}

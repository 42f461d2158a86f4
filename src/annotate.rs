use std::{collections::HashMap, path::Path};

use fontdue::{
    Font, FontSettings,
    layout::{
        CoordinateSystem, GlyphRasterConfig, HorizontalAlign, Layout, LayoutSettings, TextStyle,
        VerticalAlign, WrapStyle,
    },
};

use crate::{
    error::{PloopError, PloopResult},
    frame::FrameRgba,
};

/// Fixed anchor for the timestamp overlay, in pixels from the top-left.
pub const ANNOTATION_ORIGIN: (f32, f32) = (50.0, 50.0);

/// Overlay color (opaque green).
pub const ANNOTATION_RGBA: [u8; 4] = [0, 255, 0, 255];

const BASE_FONT_PX: f32 = 22.0;
const FONT_SCALE: f32 = 1.5;

/// Where we look for a usable sans-serif face when the caller does not supply
/// `--font`. First hit wins.
const SYSTEM_FONT_CANDIDATES: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

struct GlyphBitmap {
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

/// Renders the simulated timestamp onto frames in place.
///
/// Drawing is a straight alpha blend of [`ANNOTATION_RGBA`] weighted by glyph
/// coverage. Text is drawn twice with a one-pixel horizontal offset, standing in
/// for a stroke thickness of 2. There is no wrapping or truncation: a string wider
/// than the frame simply runs off the edge.
pub struct Annotator {
    font: Font,
    px: f32,
    glyph_cache: HashMap<GlyphRasterConfig, GlyphBitmap>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("px", &self.px)
            .field("cached_glyphs", &self.glyph_cache.len())
            .finish_non_exhaustive()
    }
}

impl Annotator {
    pub fn from_font_path(path: &Path) -> PloopResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PloopError::setup(format!("cannot read font '{}': {e}", path.display()))
        })?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            PloopError::setup(format!("cannot parse font '{}': {e}", path.display()))
        })?;
        Ok(Self {
            font,
            px: BASE_FONT_PX * FONT_SCALE,
            glyph_cache: HashMap::new(),
        })
    }

    /// Probe the usual system font locations for a sans-serif face.
    pub fn from_system() -> PloopResult<Self> {
        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if path.is_file() {
                tracing::debug!(font = candidate, "using system font");
                return Self::from_font_path(path);
            }
        }
        Err(PloopError::setup(
            "no usable system font found for annotation; pass --font <path-to-ttf>",
        ))
    }

    /// Draw `text` onto `frame` at the fixed anchor. Mutates the frame in place.
    pub fn annotate(&mut self, frame: &mut FrameRgba, text: &str) {
        self.draw_at(frame, ANNOTATION_ORIGIN.0, ANNOTATION_ORIGIN.1, text);
        self.draw_at(frame, ANNOTATION_ORIGIN.0 + 1.0, ANNOTATION_ORIGIN.1, text);
    }

    fn draw_at(&mut self, frame: &mut FrameRgba, x: f32, y: f32, text: &str) {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x,
            y,
            max_width: None,
            max_height: None,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            line_height: 1.0,
            wrap_style: WrapStyle::Letter,
            wrap_hard_breaks: false,
        });
        layout.append(&[&self.font], &TextStyle::new(text, self.px, 0));

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let bitmap = self.glyph_cache.entry(glyph.key).or_insert_with(|| {
                let (_, coverage) = self.font.rasterize_config(glyph.key);
                GlyphBitmap {
                    width: glyph.width,
                    height: glyph.height,
                    coverage,
                }
            });

            let gx = glyph.x.round() as i32;
            let gy = glyph.y.round() as i32;
            for row in 0..bitmap.height {
                for col in 0..bitmap.width {
                    let coverage = bitmap.coverage[row * bitmap.width + col];
                    frame.blend_pixel(
                        gx + col as i32,
                        gy + row as i32,
                        ANNOTATION_RGBA,
                        coverage,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Annotation needs a real font file. When the host has none of the candidate
    // faces these tests bail out instead of failing.
    fn system_annotator() -> Option<Annotator> {
        Annotator::from_system().ok()
    }

    #[test]
    fn missing_font_path_is_a_setup_error() {
        let err = Annotator::from_font_path(Path::new("target/nope.ttf")).unwrap_err();
        assert!(matches!(err, PloopError::Setup(_)));
    }

    #[test]
    fn garbage_font_bytes_are_a_setup_error() {
        let dir = std::path::PathBuf::from("target").join("annotate_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_a_font.ttf");
        std::fs::write(&path, b"garbage").unwrap();
        let err = Annotator::from_font_path(&path).unwrap_err();
        assert!(matches!(err, PloopError::Setup(_)));
    }

    #[test]
    fn debug_formatting_omits_the_font() {
        let Some(annotator) = system_annotator() else {
            return;
        };
        let rendered = format!("{annotator:?}");
        assert!(rendered.contains("Annotator"));
        assert!(rendered.contains("cached_glyphs"));
    }

    #[test]
    fn annotate_writes_green_into_the_frame() {
        let Some(mut annotator) = system_annotator() else {
            return;
        };
        let mut frame = FrameRgba::solid(400, 200, [0, 0, 0, 255]).unwrap();
        let before = frame.clone();
        annotator.annotate(&mut frame, "2024-01-01 00:00:00 +0000");
        assert_ne!(frame, before, "annotation should change pixels");

        let touched = frame
            .data
            .chunks_exact(4)
            .zip(before.data.chunks_exact(4))
            .filter(|(a, b)| a != b)
            .all(|(px, _)| px[1] >= px[0] && px[1] >= px[2]);
        assert!(touched, "changed pixels should be green-dominant");
    }

    #[test]
    fn annotate_on_a_tiny_frame_does_not_panic() {
        let Some(mut annotator) = system_annotator() else {
            return;
        };
        // Anchor (50, 50) lies entirely outside a 8x8 frame; overflow is accepted.
        let mut frame = FrameRgba::solid(8, 8, [0, 0, 0, 255]).unwrap();
        annotator.annotate(&mut frame, "way too long for this frame");
    }
}

use crate::error::{PloopError, PloopResult};

/// One decoded raster image, the unit of work flowing through the pipeline.
///
/// Straight (non-premultiplied) RGBA8, row-major, `data.len() == width * height * 4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgba {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> PloopResult<Self> {
        if width == 0 || height == 0 {
            return Err(PloopError::decode("frame dimensions must be non-zero"));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(PloopError::decode(format!(
                "frame buffer is {} bytes, expected {} for {}x{} rgba8",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid-color frame, mainly useful in tests.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PloopResult<Self> {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self::new(width, height, data)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Blend `color` over the pixel at (x, y) with the given coverage (0..=255).
    /// Out-of-bounds coordinates are ignored, so callers may draw past the edge.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4], coverage: u8) {
        if coverage == 0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let a = u16::from(coverage);
        let inv = 255 - a;
        for c in 0..3 {
            let src = u16::from(color[c]);
            let dst = u16::from(self.data[i + c]);
            self.data[i + c] = ((src * a + dst * inv + 127) / 255) as u8;
        }
        self.data[i + 3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_area_and_bad_length() {
        assert!(FrameRgba::new(0, 4, vec![]).is_err());
        assert!(FrameRgba::new(4, 0, vec![]).is_err());
        assert!(FrameRgba::new(2, 2, vec![0u8; 15]).is_err());
        assert!(FrameRgba::new(2, 2, vec![0u8; 16]).is_ok());
    }

    #[test]
    fn blend_full_coverage_replaces_rgb() {
        let mut f = FrameRgba::solid(2, 2, [10, 20, 30, 255]).unwrap();
        f.blend_pixel(1, 1, [0, 255, 0, 255], 255);
        assert_eq!(f.pixel(1, 1), Some([0, 255, 0, 255]));
        assert_eq!(f.pixel(0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn blend_out_of_bounds_is_a_no_op() {
        let mut f = FrameRgba::solid(2, 2, [0, 0, 0, 255]).unwrap();
        f.blend_pixel(-1, 0, [255, 255, 255, 255], 255);
        f.blend_pixel(0, 5, [255, 255, 255, 255], 255);
        f.blend_pixel(5, 0, [255, 255, 255, 255], 255);
        assert_eq!(f, FrameRgba::solid(2, 2, [0, 0, 0, 255]).unwrap());
    }

    #[test]
    fn blend_half_coverage_mixes() {
        let mut f = FrameRgba::solid(1, 1, [0, 0, 0, 255]).unwrap();
        f.blend_pixel(0, 0, [0, 255, 0, 255], 128);
        let px = f.pixel(0, 0).unwrap();
        assert_eq!(px[0], 0);
        assert_eq!(px[1], 128);
        assert_eq!(px[2], 0);
    }
}

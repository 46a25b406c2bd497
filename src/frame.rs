use crate::error::{SlidereelError, SlidereelResult};

/// Output frame dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> SlidereelResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidereelError::validation(
                "frame size width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Owned opaque RGB8 pixel buffer, row-major, 3 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgb {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> SlidereelResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| SlidereelError::validation("frame buffer size overflow"))?;
        if data.len() != expected {
            return Err(SlidereelError::validation(format!(
                "frame buffer length {} does not match {}x{}x3",
                data.len(),
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

    pub fn solid(size: FrameSize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(size.pixel_count() * 3);
        for _ in 0..size.pixel_count() {
            data.extend_from_slice(&rgb);
        }
        Self {
            width: size.width,
            height: size.height,
            data,
        }
    }

    pub fn black(size: FrameSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0u8; size.pixel_count() * 3],
        }
    }

    pub fn white(size: FrameSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![255u8; size.pixel_count() * 3],
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_rejects_zero_dimensions() {
        assert!(FrameSize::new(0, 10).is_err());
        assert!(FrameSize::new(10, 0).is_err());
        assert!(FrameSize::new(4, 3).is_ok());
    }

    #[test]
    fn new_rejects_mismatched_buffer() {
        assert!(FrameRgb::new(2, 2, vec![0u8; 11]).is_err());
        assert!(FrameRgb::new(2, 2, vec![0u8; 12]).is_ok());
    }

    #[test]
    fn solid_fills_every_pixel() {
        let size = FrameSize::new(3, 2).unwrap();
        let f = FrameRgb::solid(size, [10, 20, 30]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(f.pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn put_pixel_round_trips() {
        let mut f = FrameRgb::black(FrameSize::new(4, 4).unwrap());
        f.put_pixel(3, 1, [1, 2, 3]);
        assert_eq!(f.pixel(3, 1), [1, 2, 3]);
        assert_eq!(f.pixel(0, 0), [0, 0, 0]);
    }
}

use crate::{
    error::{SlidereelError, SlidereelResult},
    frame::FrameRgb,
};

/// Separable box blur over an RGB8 frame. `kernel` must be odd; edges are
/// replicated so the output never darkens toward the border. A kernel of 1
/// is the identity.
pub fn box_blur_rgb8(frame: &FrameRgb, kernel: u32) -> SlidereelResult<FrameRgb> {
    if kernel == 0 || kernel.is_multiple_of(2) {
        return Err(SlidereelError::validation("blur kernel must be odd and > 0"));
    }
    if kernel == 1 {
        return Ok(frame.clone());
    }

    let radius = (kernel / 2) as i64;
    let mut tmp = frame.clone();
    let mut out = frame.clone();

    horizontal_pass(frame, &mut tmp, radius);
    vertical_pass(&tmp, &mut out, radius);
    Ok(out)
}

fn horizontal_pass(src: &FrameRgb, dst: &mut FrameRgb, radius: i64) {
    let w = src.width as i64;
    let k = (2 * radius + 1) as u32;
    for y in 0..src.height {
        for x in 0..w {
            let mut acc = [0u32; 3];
            for dx in -radius..=radius {
                let sx = (x + dx).clamp(0, w - 1) as u32;
                let px = src.pixel(sx, y);
                for c in 0..3 {
                    acc[c] += u32::from(px[c]);
                }
            }
            dst.put_pixel(x as u32, y, avg(acc, k));
        }
    }
}

fn vertical_pass(src: &FrameRgb, dst: &mut FrameRgb, radius: i64) {
    let h = src.height as i64;
    let k = (2 * radius + 1) as u32;
    for y in 0..h {
        for x in 0..src.width {
            let mut acc = [0u32; 3];
            for dy in -radius..=radius {
                let sy = (y + dy).clamp(0, h - 1) as u32;
                let px = src.pixel(x, sy);
                for c in 0..3 {
                    acc[c] += u32::from(px[c]);
                }
            }
            dst.put_pixel(x, y as u32, avg(acc, k));
        }
    }
}

fn avg(acc: [u32; 3], k: u32) -> [u8; 3] {
    [
        ((acc[0] + k / 2) / k) as u8,
        ((acc[1] + k / 2) / k) as u8,
        ((acc[2] + k / 2) / k) as u8,
    ]
}

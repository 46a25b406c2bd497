use kurbo::{Affine, Point};

use crate::{
    error::{SlidereelError, SlidereelResult},
    frame::{FrameRgb, FrameSize},
};

/// Pan direction over the image plane. Diagonals name the corner the view
/// moves toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
    DiagonalTr,
    DiagonalTl,
    DiagonalBr,
    DiagonalBl,
}

/// Smallest size that fully covers `target` while preserving the source
/// aspect ratio. Both result dimensions are >= the target's.
pub fn cover_size(source: FrameSize, target: FrameSize) -> (u32, u32) {
    let frame_ratio = source.aspect();
    let target_ratio = target.aspect();

    let (new_w, new_h) = if frame_ratio > target_ratio {
        let new_h = target.height;
        let new_w = (f64::from(new_h) * frame_ratio) as u32;
        (new_w, new_h)
    } else {
        let new_w = target.width;
        let new_h = (f64::from(new_w) / frame_ratio) as u32;
        (new_w, new_h)
    };

    (new_w.max(target.width), new_h.max(target.height))
}

/// Bilinear resize to exactly `new_w` x `new_h`.
pub fn resize(frame: &FrameRgb, new_w: u32, new_h: u32) -> SlidereelResult<FrameRgb> {
    if new_w == 0 || new_h == 0 {
        return Err(SlidereelError::validation("resize target must be > 0"));
    }
    if new_w == frame.width && new_h == frame.height {
        return Ok(frame.clone());
    }

    let x_scale = f64::from(frame.width) / f64::from(new_w);
    let y_scale = f64::from(frame.height) / f64::from(new_h);

    let mut out = FrameRgb::black(FrameSize {
        width: new_w,
        height: new_h,
    });
    for y in 0..new_h {
        let sy = (f64::from(y) + 0.5) * y_scale - 0.5;
        for x in 0..new_w {
            let sx = (f64::from(x) + 0.5) * x_scale - 0.5;
            out.put_pixel(x, y, sample_bilinear(frame, sx, sy));
        }
    }
    Ok(out)
}

/// Scale so the result covers `target` in both dimensions, never distorting
/// the aspect ratio.
pub fn cover_resize(frame: &FrameRgb, target: FrameSize) -> SlidereelResult<FrameRgb> {
    let (new_w, new_h) = cover_size(frame.size(), target);
    resize(frame, new_w, new_h)
}

/// Crop `target` out of `frame` at the given offsets. Offsets are clamped to
/// keep the window inside the frame; the frame must be >= target in both
/// dimensions.
pub fn crop_at(
    frame: &FrameRgb,
    target: FrameSize,
    x_offset: u32,
    y_offset: u32,
) -> SlidereelResult<FrameRgb> {
    if frame.width < target.width || frame.height < target.height {
        return Err(SlidereelError::validation(format!(
            "cannot crop {}x{} out of {}x{}",
            target.width, target.height, frame.width, frame.height
        )));
    }

    let x0 = x_offset.min(frame.width - target.width) as usize;
    let y0 = y_offset.min(frame.height - target.height) as usize;

    let src_stride = frame.width as usize * 3;
    let dst_stride = target.width as usize * 3;
    let mut data = Vec::with_capacity(dst_stride * target.height as usize);
    for row in 0..target.height as usize {
        let start = (y0 + row) * src_stride + x0 * 3;
        data.extend_from_slice(&frame.data[start..start + dst_stride]);
    }

    FrameRgb::new(target.width, target.height, data)
}

/// Center crop with integer floor offsets.
pub fn center_crop(frame: &FrameRgb, target: FrameSize) -> SlidereelResult<FrameRgb> {
    let x0 = frame.width.saturating_sub(target.width) / 2;
    let y0 = frame.height.saturating_sub(target.height) / 2;
    crop_at(frame, target, x0, y0)
}

/// Pan offsets for a direction at an already-eased progress.
///
/// Opposite directions are complementary: the offset at progress p for one
/// equals the offset at 1-p for its reverse, so mirrored pans retrace the
/// same crop path.
pub fn pan_offsets(direction: Direction, progress: f64, max_x: u32, max_y: u32) -> (u32, u32) {
    let along = |m: u32| (progress * f64::from(m)) as u32;
    let against = |m: u32| ((1.0 - progress) * f64::from(m)) as u32;

    match direction {
        Direction::Right => (along(max_x), max_y / 2),
        Direction::Left => (against(max_x), max_y / 2),
        Direction::Down => (max_x / 2, along(max_y)),
        Direction::Up => (max_x / 2, against(max_y)),
        Direction::DiagonalBr => (along(max_x), along(max_y)),
        Direction::DiagonalBl => (against(max_x), along(max_y)),
        Direction::DiagonalTr => (along(max_x), against(max_y)),
        Direction::DiagonalTl => (against(max_x), against(max_y)),
    }
}

/// Directional crop used by pan effects: the movement range is the slack
/// left after cover-resizing, scaled by `max_offset_fraction` and clamped to
/// what the frame can actually provide.
pub fn directional_offset_crop(
    frame: &FrameRgb,
    target: FrameSize,
    max_offset_fraction: f64,
    direction: Direction,
    progress: f64,
) -> SlidereelResult<FrameRgb> {
    if frame.width < target.width || frame.height < target.height {
        return Err(SlidereelError::validation(format!(
            "directional crop needs a frame covering {}x{}, got {}x{}",
            target.width, target.height, frame.width, frame.height
        )));
    }

    let fraction = max_offset_fraction.max(0.0);
    let avail_x = frame.width - target.width;
    let avail_y = frame.height - target.height;
    let max_x = ((f64::from(avail_x) * fraction) as u32).min(avail_x);
    let max_y = ((f64::from(avail_y) * fraction) as u32).min(avail_y);

    let (x_offset, y_offset) = pan_offsets(direction, progress, max_x, max_y);
    crop_at(frame, target, x_offset, y_offset)
}

/// Sample `src` through `map` (output point -> source point) into a frame of
/// `out` size. Out-of-bounds lookups clamp to the edge, replicating border
/// pixels instead of introducing empty corners.
pub fn affine_sample(src: &FrameRgb, map: Affine, out: FrameSize) -> FrameRgb {
    let mut dst = FrameRgb::black(out);
    for y in 0..out.height {
        for x in 0..out.width {
            let p = map * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            dst.put_pixel(x, y, sample_bilinear(src, p.x - 0.5, p.y - 0.5));
        }
    }
    dst
}

fn sample_bilinear(src: &FrameRgb, fx: f64, fy: f64) -> [u8; 3] {
    let max_x = (src.width - 1) as i64;
    let max_y = (src.height - 1) as i64;

    let x0 = fx.floor() as i64;
    let y0 = fy.floor() as i64;
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let cx0 = x0.clamp(0, max_x) as u32;
    let cx1 = (x0 + 1).clamp(0, max_x) as u32;
    let cy0 = y0.clamp(0, max_y) as u32;
    let cy1 = (y0 + 1).clamp(0, max_y) as u32;

    let p00 = src.pixel(cx0, cy0);
    let p10 = src.pixel(cx1, cy0);
    let p01 = src.pixel(cx0, cy1);
    let p11 = src.pixel(cx1, cy1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = f64::from(p00[c]) * (1.0 - tx) + f64::from(p10[c]) * tx;
        let bottom = f64::from(p01[c]) * (1.0 - tx) + f64::from(p11[c]) * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> FrameSize {
        FrameSize::new(w, h).unwrap()
    }

    fn gradient(w: u32, h: u32) -> FrameRgb {
        let mut f = FrameRgb::black(size(w, h));
        for y in 0..h {
            for x in 0..w {
                f.put_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 7]);
            }
        }
        f
    }

    #[test]
    fn cover_size_covers_both_dimensions() {
        // Wider than target: fit height, width spills over.
        let (w, h) = cover_size(size(400, 100), size(200, 100));
        assert_eq!(h, 100);
        assert!(w >= 200);

        // Taller than target: fit width, height spills over.
        let (w, h) = cover_size(size(100, 400), size(100, 200));
        assert_eq!(w, 100);
        assert!(h >= 200);

        // Matching aspect: exact target.
        assert_eq!(cover_size(size(640, 360), size(1280, 720)), (1280, 720));
    }

    #[test]
    fn resize_identity_is_lossless() {
        let f = gradient(8, 6);
        assert_eq!(resize(&f, 8, 6).unwrap(), f);
    }

    #[test]
    fn resize_constant_image_stays_constant() {
        let f = FrameRgb::solid(size(5, 5), [9, 90, 200]);
        let out = resize(&f, 13, 7).unwrap();
        for y in 0..7 {
            for x in 0..13 {
                assert_eq!(out.pixel(x, y), [9, 90, 200]);
            }
        }
    }

    #[test]
    fn crop_at_clamps_offsets() {
        let f = gradient(10, 10);
        let out = crop_at(&f, size(4, 4), 99, 99).unwrap();
        // Offset clamped to 6,6: top-left pixel of the crop is source (6,6).
        assert_eq!(out.pixel(0, 0), f.pixel(6, 6));
    }

    #[test]
    fn crop_rejects_undersized_frame() {
        let f = gradient(3, 3);
        assert!(crop_at(&f, size(4, 4), 0, 0).is_err());
        assert!(center_crop(&f, size(4, 4)).is_err());
    }

    #[test]
    fn center_crop_uses_floor_offsets() {
        let f = gradient(7, 5);
        let out = center_crop(&f, size(4, 4)).unwrap();
        // (7-4)/2 = 1, (5-4)/2 = 0
        assert_eq!(out.pixel(0, 0), f.pixel(1, 0));
    }

    #[test]
    fn opposite_pan_directions_are_complementary() {
        for p in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let (rx, _) = pan_offsets(Direction::Right, p, 100, 40);
            let (lx, _) = pan_offsets(Direction::Left, 1.0 - p, 100, 40);
            assert_eq!(rx, lx, "progress {p}");

            let (_, dy) = pan_offsets(Direction::Down, p, 100, 40);
            let (_, uy) = pan_offsets(Direction::Up, 1.0 - p, 100, 40);
            assert_eq!(dy, uy, "progress {p}");
        }
    }

    #[test]
    fn directional_crop_keeps_target_size() {
        let f = gradient(32, 24);
        let out =
            directional_offset_crop(&f, size(16, 12), 1.0, Direction::DiagonalBr, 0.7).unwrap();
        assert_eq!(out.size(), size(16, 12));
    }

    #[test]
    fn affine_identity_samples_source() {
        let f = gradient(6, 6);
        let out = affine_sample(&f, Affine::IDENTITY, size(6, 6));
        assert_eq!(out, f);
    }

    #[test]
    fn affine_out_of_bounds_replicates_edges() {
        let f = FrameRgb::solid(size(4, 4), [50, 60, 70]);
        // Shift far outside the source; edge clamp keeps the fill color.
        let out = affine_sample(&f, Affine::translate((100.0, 100.0)), size(4, 4));
        assert_eq!(out.pixel(0, 0), [50, 60, 70]);
    }
}

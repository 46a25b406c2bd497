use kurbo::{Affine, Point};

use crate::{
    blur_cpu::box_blur_rgb8,
    ease::Ease,
    error::{SlidereelError, SlidereelResult},
    frame::{FrameRgb, FrameSize},
    geometry,
};

const SPIN_DEGREES: f64 = 360.0;
const SPIN_ZOOM_SPAN: f64 = 0.3;
const GLITCH_SHIFT_FRACTION: f64 = 0.02;
const GLITCH_FLOOR: f64 = 0.1;
const GLITCH_MIX: f64 = 0.6;
const BLUR_ZOOM_SPAN: f64 = 0.4;
const BLUR_FLOOR: f64 = 0.2;
const BLUR_KERNEL_SCALE: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WipeDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Blend animation spanning the overlap between two consecutive images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransitionKind {
    CrossDissolve,
    FlashWhite,
    FadeToBlack,
    Wipe(WipeDirection),
    ZoomIn,
    ZoomOut,
    SmoothZoom,
    SmoothSlideLeft,
    SmoothSlideRight,
    SmoothFlip,
    SmoothStretch,
    SmoothSpin,
    Glitch,
    BlurZoom,
}

impl TransitionKind {
    /// Easing curve baked into the variant; not externally configurable.
    pub fn ease(self) -> Ease {
        match self {
            Self::CrossDissolve
            | Self::FlashWhite
            | Self::FadeToBlack
            | Self::Wipe(_)
            | Self::ZoomIn
            | Self::ZoomOut => Ease::Linear,
            Self::SmoothZoom | Self::SmoothFlip | Self::SmoothSpin | Self::Glitch
            | Self::BlurZoom => Ease::InOutQuad,
            Self::SmoothSlideLeft | Self::SmoothSlideRight => Ease::InOutCubic,
            Self::SmoothStretch => Ease::OutBack,
        }
    }
}

/// A transition variant plus the duration it was constructed with. The
/// duration only drives the caller's sample timing; the math itself always
/// operates on normalized progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration: f64,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration: f64) -> SlidereelResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SlidereelError::validation(
                "transition duration must be finite and > 0",
            ));
        }
        Ok(Self { kind, duration })
    }

    /// Blend `a` toward `b` at `progress`. Both frames must share one size;
    /// the result has that size.
    pub fn apply(&self, a: &FrameRgb, b: &FrameRgb, progress: f64) -> SlidereelResult<FrameRgb> {
        if a.size() != b.size() {
            return Err(SlidereelError::validation(format!(
                "transition frames must match: {}x{} vs {}x{}",
                a.width, a.height, b.width, b.height
            )));
        }

        let progress = progress.clamp(0.0, 1.0);
        let eased = self.kind.ease().apply(progress);

        match self.kind {
            TransitionKind::CrossDissolve => blend(a, b, progress),
            TransitionKind::FlashWhite => {
                let white = FrameRgb::white(a.size());
                if progress < 0.5 {
                    blend(a, &white, progress * 2.0)
                } else {
                    blend(&white, b, (progress - 0.5) * 2.0)
                }
            }
            TransitionKind::FadeToBlack => {
                let black = FrameRgb::black(a.size());
                if progress < 0.5 {
                    blend(a, &black, progress * 2.0)
                } else {
                    blend(&black, b, (progress - 0.5) * 2.0)
                }
            }
            TransitionKind::Wipe(dir) => Ok(wipe(a, b, dir, progress)),
            TransitionKind::ZoomIn => {
                let zoomed = zoom_into(a, 1.0 + progress * 0.5)?;
                blend(&zoomed, b, progress)
            }
            TransitionKind::ZoomOut => {
                let zoomed = zoom_into(a, 1.5 - progress * 0.5)?;
                blend(&zoomed, b, progress)
            }
            TransitionKind::SmoothZoom => {
                let zoomed = zoom_into(a, 1.0 + eased * 0.3)?;
                blend(&zoomed, b, eased)
            }
            TransitionKind::SmoothSlideLeft => slide(a, b, eased, true),
            TransitionKind::SmoothSlideRight => slide(a, b, eased, false),
            TransitionKind::SmoothFlip => flip(a, b, eased),
            TransitionKind::SmoothStretch => stretch(a, b, eased),
            TransitionKind::SmoothSpin => {
                let size = a.size();
                let center = Point::new(f64::from(size.width) / 2.0, f64::from(size.height) / 2.0);
                let zoom = 1.0 + eased * SPIN_ZOOM_SPAN;
                let angle = (eased * SPIN_DEGREES).to_radians();
                let forward = Affine::rotate_about(angle, center)
                    * Affine::translate(center.to_vec2())
                    * Affine::scale(zoom)
                    * Affine::translate(-center.to_vec2());
                let spun = geometry::affine_sample(a, forward.inverse(), size);
                blend(&spun, b, eased)
            }
            TransitionKind::Glitch => glitch(a, b, eased),
            TransitionKind::BlurZoom => {
                let mut zoomed = zoom_into(a, 1.0 + eased * BLUR_ZOOM_SPAN)?;
                let blur_intensity = 1.0 - (eased - 0.5).abs() * 2.0;
                if blur_intensity > BLUR_FLOOR {
                    let kernel = ((BLUR_KERNEL_SCALE * blur_intensity) as u32 | 1).max(3);
                    zoomed = box_blur_rgb8(&zoomed, kernel)?;
                }
                blend(&zoomed, b, eased)
            }
        }
    }
}

/// Per-channel alpha blend: `round(a*(1-alpha) + b*alpha)`.
pub fn blend(a: &FrameRgb, b: &FrameRgb, alpha: f64) -> SlidereelResult<FrameRgb> {
    if a.data.len() != b.data.len() {
        return Err(SlidereelError::validation(
            "blend expects equal-length rgb8 buffers",
        ));
    }
    let alpha = alpha.clamp(0.0, 1.0);
    let mut data = Vec::with_capacity(a.data.len());
    for (&av, &bv) in a.data.iter().zip(b.data.iter()) {
        let v = f64::from(av) * (1.0 - alpha) + f64::from(bv) * alpha;
        data.push(v.round().clamp(0.0, 255.0) as u8);
    }
    FrameRgb::new(a.width, a.height, data)
}

/// Crop tighter by `zoom` around the center, then scale back to full size.
fn zoom_into(frame: &FrameRgb, zoom: f64) -> SlidereelResult<FrameRgb> {
    let zoom = zoom.max(1.0);
    let inner = FrameSize {
        width: ((f64::from(frame.width) / zoom) as u32).clamp(1, frame.width),
        height: ((f64::from(frame.height) / zoom) as u32).clamp(1, frame.height),
    };
    let cropped = geometry::center_crop(frame, inner)?;
    geometry::resize(&cropped, frame.width, frame.height)
}

fn wipe(a: &FrameRgb, b: &FrameRgb, dir: WipeDirection, progress: f64) -> FrameRgb {
    let (w, h) = (a.width, a.height);
    let mut out = a.clone();
    match dir {
        WipeDirection::Left => {
            let pos = (f64::from(w) * progress) as u32;
            copy_columns(&mut out, b, 0, pos);
        }
        WipeDirection::Right => {
            let pos = (f64::from(w) * (1.0 - progress)) as u32;
            copy_columns(&mut out, b, pos.min(w), w);
        }
        WipeDirection::Up => {
            let pos = (f64::from(h) * progress) as u32;
            copy_rows(&mut out, b, 0, pos);
        }
        WipeDirection::Down => {
            let pos = (f64::from(h) * (1.0 - progress)) as u32;
            copy_rows(&mut out, b, pos.min(h), h);
        }
    }
    out
}

fn copy_rows(dst: &mut FrameRgb, src: &FrameRgb, y0: u32, y1: u32) {
    let stride = dst.width as usize * 3;
    let (start, end) = (y0 as usize * stride, (y1 as usize * stride).min(src.data.len()));
    if start < end {
        dst.data[start..end].copy_from_slice(&src.data[start..end]);
    }
}

fn copy_columns(dst: &mut FrameRgb, src: &FrameRgb, x0: u32, x1: u32) {
    if x0 >= x1 {
        return;
    }
    let stride = dst.width as usize * 3;
    for row in 0..dst.height as usize {
        let a = row * stride + x0 as usize * 3;
        let b = row * stride + (x1 as usize * 3).min(stride);
        dst.data[a..b].copy_from_slice(&src.data[a..b]);
    }
}

/// Both frames translate horizontally; hard pixel replacement at the seam.
fn slide(a: &FrameRgb, b: &FrameRgb, eased: f64, leftward: bool) -> SlidereelResult<FrameRgb> {
    let (w, h) = (a.width, a.height);
    let offset = ((f64::from(w) * eased) as u32).min(w);
    let mut out = FrameRgb::black(a.size());

    let stride = w as usize * 3;
    for row in 0..h as usize {
        let dst_row = &mut out.data[row * stride..(row + 1) * stride];
        let a_row = &a.data[row * stride..(row + 1) * stride];
        let b_row = &b.data[row * stride..(row + 1) * stride];
        let split = (w - offset) as usize * 3;
        let off = offset as usize * 3;
        if leftward {
            // a exits left, b enters from the right edge.
            dst_row[..split].copy_from_slice(&a_row[off..]);
            dst_row[split..].copy_from_slice(&b_row[..off]);
        } else {
            // a exits right, b enters from the left edge.
            dst_row[off..].copy_from_slice(&a_row[..split]);
            dst_row[..off].copy_from_slice(&b_row[split..]);
        }
    }
    Ok(out)
}

/// Horizontal flip: the outgoing frame collapses to zero width over the
/// first half, the incoming frame expands over the second. A narrow blend
/// band around the midpoint hides the swap.
fn flip(a: &FrameRgb, b: &FrameRgb, eased: f64) -> SlidereelResult<FrameRgb> {
    let (w, h) = (a.width, a.height);
    let (scale, current) = if eased < 0.5 {
        (1.0 - eased * 2.0, a)
    } else {
        ((eased - 0.5) * 2.0, b)
    };

    let new_w = ((f64::from(w) * scale) as u32).max(1);
    let resized = geometry::resize(current, new_w, h)?;

    let mut out = FrameRgb::black(a.size());
    paste(&mut out, &resized, (w - new_w) / 2, 0);

    if eased > 0.4 && eased < 0.6 {
        let alpha = (eased - 0.5).abs() * 2.0;
        return blend(a, b, alpha);
    }
    Ok(out)
}

/// Outgoing frame shrinks to half size while the incoming frame grows from
/// zero, both center-anchored, with overshoot easing already applied.
fn stretch(a: &FrameRgb, b: &FrameRgb, eased: f64) -> SlidereelResult<FrameRgb> {
    let (w, h) = (a.width, a.height);

    let scale1 = (1.0 - eased * 0.5).clamp(0.0, 1.0);
    let scale2 = eased.max(0.0);

    let w1 = ((f64::from(w) * scale1) as u32).max(1);
    let h1 = ((f64::from(h) * scale1) as u32).max(1);
    let resized1 = geometry::resize(a, w1, h1)?;

    let mut out = FrameRgb::black(a.size());
    paste(&mut out, &resized1, (w - w1) / 2, (h - h1) / 2);

    // Overshoot can push the incoming frame past full size; crop it back to
    // the canvas so the center stays anchored.
    let w2 = ((f64::from(w) * scale2) as u32).max(1);
    let h2 = ((f64::from(h) * scale2) as u32).max(1);
    let mut resized2 = geometry::resize(b, w2, h2)?;
    if resized2.width > w || resized2.height > h {
        resized2 = geometry::center_crop(
            &resized2,
            FrameSize {
                width: resized2.width.min(w),
                height: resized2.height.min(h),
            },
        )?;
    }

    let alpha = eased.clamp(0.0, 1.0);
    blend_region(
        &mut out,
        &resized2,
        (w - resized2.width) / 2,
        (h - resized2.height) / 2,
        alpha,
    );
    Ok(out)
}

fn glitch(a: &FrameRgb, b: &FrameRgb, eased: f64) -> SlidereelResult<FrameRgb> {
    let base = blend(a, b, eased)?;

    let glitch_intensity = 1.0 - (eased - 0.5).abs() * 2.0;
    if glitch_intensity <= GLITCH_FLOOR {
        return Ok(base);
    }

    let shift = (f64::from(base.width) * GLITCH_SHIFT_FRACTION * glitch_intensity) as i64;
    let mut glitched = base.clone();
    let max_x = (base.width - 1) as i64;
    for y in 0..base.height {
        for x in 0..base.width as i64 {
            // Red samples from the left, blue from the right; green stays.
            let r = base.pixel((x - shift).clamp(0, max_x) as u32, y)[0];
            let bch = base.pixel((x + shift).clamp(0, max_x) as u32, y)[2];
            let g = glitched.pixel(x as u32, y)[1];
            glitched.put_pixel(x as u32, y, [r, g, bch]);
        }
    }

    blend(&base, &glitched, GLITCH_MIX * glitch_intensity)
}

fn paste(dst: &mut FrameRgb, src: &FrameRgb, x0: u32, y0: u32) {
    let copy_w = src.width.min(dst.width - x0.min(dst.width)) as usize;
    let dst_stride = dst.width as usize * 3;
    let src_stride = src.width as usize * 3;
    for row in 0..src.height.min(dst.height.saturating_sub(y0)) as usize {
        let d = (y0 as usize + row) * dst_stride + x0 as usize * 3;
        let s = row * src_stride;
        dst.data[d..d + copy_w * 3].copy_from_slice(&src.data[s..s + copy_w * 3]);
    }
}

fn blend_region(dst: &mut FrameRgb, src: &FrameRgb, x0: u32, y0: u32, alpha: f64) {
    let alpha = alpha.clamp(0.0, 1.0);
    for y in 0..src.height.min(dst.height.saturating_sub(y0)) {
        for x in 0..src.width.min(dst.width.saturating_sub(x0)) {
            let d = dst.pixel(x0 + x, y0 + y);
            let s = src.pixel(x, y);
            let mut px = [0u8; 3];
            for c in 0..3 {
                let v = f64::from(d[c]) * (1.0 - alpha) + f64::from(s[c]) * alpha;
                px[c] = v.round().clamp(0.0, 255.0) as u8;
            }
            dst.put_pixel(x0 + x, y0 + y, px);
        }
    }
}

use kurbo::{Affine, Point};

use crate::{
    ease::Ease,
    error::{SlidereelError, SlidereelResult},
    frame::{FrameRgb, FrameSize},
    geometry::{self, Direction},
};

const ZOOM_CONTINUOUS_SPAN: f64 = 0.3;
const ZOOM_IN_OUT_SPAN: f64 = 0.2;
const ROTATE_FULL_DEGREES: f64 = 360.0;
const ROTATE_SLOW_DEGREES: f64 = 15.0;
// Cover overshoot so rotation never exposes empty corners.
const ROTATE_MARGIN: f64 = 1.5;
const ROTATE_SLOW_MARGIN: f64 = 1.3;

/// Continuous per-image transform applied across the image's whole display
/// interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    Static,
    Pan(Direction),
    ZoomInContinuous,
    ZoomOutContinuous,
    ZoomInOut,
    RotateCw,
    RotateCcw,
    RotateSlow,
}

impl EffectKind {
    /// Easing curve baked into the variant; not externally configurable.
    pub fn ease(self) -> Ease {
        match self {
            Self::Static => Ease::Linear,
            _ => Ease::InOutQuad,
        }
    }
}

/// An effect variant plus the intensity it was constructed with. Stateless
/// across calls: `apply` is a pure function of its arguments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub intensity: f64,
}

impl Effect {
    pub fn new(kind: EffectKind, intensity: f64) -> SlidereelResult<Self> {
        if !intensity.is_finite() || intensity < 0.0 {
            return Err(SlidereelError::validation(
                "effect intensity must be finite and >= 0",
            ));
        }
        Ok(Self { kind, intensity })
    }

    /// Render the source at `progress` into a frame of exactly `target` size.
    pub fn apply(
        &self,
        frame: &FrameRgb,
        progress: f64,
        target: FrameSize,
    ) -> SlidereelResult<FrameRgb> {
        let eased = self.kind.ease().apply(progress);

        match self.kind {
            EffectKind::Static => {
                if frame.size() == target {
                    return Ok(frame.clone());
                }
                let covered = geometry::cover_resize(frame, target)?;
                geometry::center_crop(&covered, target)
            }
            EffectKind::Pan(direction) => {
                let covered = geometry::cover_resize(frame, target)?;
                geometry::directional_offset_crop(&covered, target, self.intensity, direction, eased)
            }
            EffectKind::ZoomInContinuous => {
                let max_zoom = 1.0 + ZOOM_CONTINUOUS_SPAN * self.intensity;
                let zoom = 1.0 + eased * (max_zoom - 1.0);
                self.zoom_crop(frame, target, zoom)
            }
            EffectKind::ZoomOutContinuous => {
                let max_zoom = 1.0 + ZOOM_CONTINUOUS_SPAN * self.intensity;
                let zoom = max_zoom - eased * (max_zoom - 1.0);
                self.zoom_crop(frame, target, zoom)
            }
            EffectKind::ZoomInOut => {
                let max_zoom = 1.0 + ZOOM_IN_OUT_SPAN * self.intensity;
                let zoom = if eased < 0.5 {
                    1.0 + (eased * 2.0) * (max_zoom - 1.0)
                } else {
                    max_zoom - ((eased - 0.5) * 2.0) * (max_zoom - 1.0)
                };
                self.zoom_crop(frame, target, zoom)
            }
            EffectKind::RotateCw => {
                self.rotate_crop(frame, target, eased, ROTATE_FULL_DEGREES, ROTATE_MARGIN)
            }
            EffectKind::RotateCcw => {
                self.rotate_crop(frame, target, eased, -ROTATE_FULL_DEGREES, ROTATE_MARGIN)
            }
            EffectKind::RotateSlow => self.rotate_crop(
                frame,
                target,
                eased,
                ROTATE_SLOW_DEGREES,
                ROTATE_SLOW_MARGIN,
            ),
        }
    }

    fn zoom_crop(&self, frame: &FrameRgb, target: FrameSize, zoom: f64) -> SlidereelResult<FrameRgb> {
        let zoom = zoom.max(1.0);
        let (cover_w, cover_h) = geometry::cover_size(frame.size(), target);
        let zoom_w = ((f64::from(cover_w) * zoom) as u32).max(target.width);
        let zoom_h = ((f64::from(cover_h) * zoom) as u32).max(target.height);

        let resized = geometry::resize(frame, zoom_w, zoom_h)?;
        geometry::center_crop(&resized, target)
    }

    fn rotate_crop(
        &self,
        frame: &FrameRgb,
        target: FrameSize,
        eased: f64,
        max_degrees: f64,
        margin: f64,
    ) -> SlidereelResult<FrameRgb> {
        let oversized = FrameSize {
            width: ((f64::from(target.width) * margin) as u32).max(target.width),
            height: ((f64::from(target.height) * margin) as u32).max(target.height),
        };
        let (cover_w, cover_h) = geometry::cover_size(frame.size(), oversized);
        let resized = geometry::resize(frame, cover_w, cover_h)?;

        let angle = (eased * max_degrees * self.intensity).to_radians();
        let center = Point::new(f64::from(cover_w) / 2.0, f64::from(cover_h) / 2.0);
        let x0 = f64::from((cover_w - target.width) / 2);
        let y0 = f64::from((cover_h - target.height) / 2);

        // Output pixel -> center crop of the resized plane -> inverse rotation.
        let map = Affine::rotate_about(-angle, center) * Affine::translate((x0, y0));
        Ok(geometry::affine_sample(&resized, map, target))
    }
}

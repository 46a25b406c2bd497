use std::collections::BTreeMap;

use crate::{
    effects::{Effect, EffectKind},
    error::{SlidereelError, SlidereelResult},
    geometry::Direction,
    transitions::{Transition, TransitionKind, WipeDirection},
};

/// Name -> effect variant mapping. Built once at startup and treated as
/// read-only afterwards; lookups of unregistered names fail loudly with the
/// list of valid names.
#[derive(Clone, Debug)]
pub struct EffectRegistry {
    entries: BTreeMap<String, EffectKind>,
}

impl EffectRegistry {
    /// Registry with every built-in effect and its aliases.
    pub fn builtin() -> Self {
        let mut reg = Self {
            entries: BTreeMap::new(),
        };

        reg.register("static", EffectKind::Static);
        reg.register("none", EffectKind::Static); // alias

        reg.register("pan_right", EffectKind::Pan(Direction::Right));
        reg.register("pan_left", EffectKind::Pan(Direction::Left));
        reg.register("pan_up", EffectKind::Pan(Direction::Up));
        reg.register("pan_down", EffectKind::Pan(Direction::Down));
        reg.register("pan_diagonal_tr", EffectKind::Pan(Direction::DiagonalTr));
        reg.register("pan_diagonal_tl", EffectKind::Pan(Direction::DiagonalTl));
        reg.register("pan_diagonal_br", EffectKind::Pan(Direction::DiagonalBr));
        reg.register("pan_diagonal_bl", EffectKind::Pan(Direction::DiagonalBl));

        reg.register("zoom_in_continuous", EffectKind::ZoomInContinuous);
        reg.register("zoom_out_continuous", EffectKind::ZoomOutContinuous);
        reg.register("zoom_in_out", EffectKind::ZoomInOut);
        reg.register("breathing", EffectKind::ZoomInOut); // alias

        reg.register("rotate_cw", EffectKind::RotateCw);
        reg.register("rotate_ccw", EffectKind::RotateCcw);
        reg.register("rotate_slow", EffectKind::RotateSlow);

        reg
    }

    /// Idempotent: re-registering a name simply overwrites the entry.
    pub fn register(&mut self, name: impl Into<String>, kind: EffectKind) {
        self.entries.insert(name.into(), kind);
    }

    pub fn get(&self, name: &str, intensity: f64) -> SlidereelResult<Effect> {
        let Some(&kind) = self.entries.get(name) else {
            return Err(SlidereelError::lookup("effect", name, self.list_available()));
        };
        Effect::new(kind, intensity)
    }

    pub fn list_available(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Name -> transition variant mapping; same contract as [`EffectRegistry`].
#[derive(Clone, Debug)]
pub struct TransitionRegistry {
    entries: BTreeMap<String, TransitionKind>,
}

impl TransitionRegistry {
    /// Registry with every built-in transition and its aliases.
    pub fn builtin() -> Self {
        let mut reg = Self {
            entries: BTreeMap::new(),
        };

        reg.register("cross_dissolve", TransitionKind::CrossDissolve);
        reg.register("fade", TransitionKind::CrossDissolve); // alias
        reg.register("flash_white", TransitionKind::FlashWhite);
        reg.register("flash", TransitionKind::FlashWhite); // alias
        reg.register("fade_to_black", TransitionKind::FadeToBlack);

        reg.register("wipe_left", TransitionKind::Wipe(WipeDirection::Left));
        reg.register("wipe_right", TransitionKind::Wipe(WipeDirection::Right));
        reg.register("wipe_up", TransitionKind::Wipe(WipeDirection::Up));
        reg.register("wipe_down", TransitionKind::Wipe(WipeDirection::Down));

        reg.register("zoom_in", TransitionKind::ZoomIn);
        reg.register("zoom_out", TransitionKind::ZoomOut);
        reg.register("smooth_zoom", TransitionKind::SmoothZoom);

        reg.register("smooth_slide_left", TransitionKind::SmoothSlideLeft);
        reg.register("smooth_slide_right", TransitionKind::SmoothSlideRight);
        reg.register("smooth_flip", TransitionKind::SmoothFlip);
        reg.register("smooth_stretch", TransitionKind::SmoothStretch);

        reg.register("smooth_spin", TransitionKind::SmoothSpin);
        reg.register("glitch", TransitionKind::Glitch);
        reg.register("blur_zoom", TransitionKind::BlurZoom);

        reg
    }

    /// Idempotent: re-registering a name simply overwrites the entry.
    pub fn register(&mut self, name: impl Into<String>, kind: TransitionKind) {
        self.entries.insert(name.into(), kind);
    }

    pub fn get(&self, name: &str, duration: f64) -> SlidereelResult<Transition> {
        let Some(&kind) = self.entries.get(name) else {
            return Err(SlidereelError::lookup(
                "transition",
                name,
                self.list_available(),
            ));
        };
        Transition::new(kind, duration)
    }

    pub fn list_available(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_effects_resolve() {
        let reg = EffectRegistry::builtin();
        for name in ["static", "pan_right", "zoom_in_continuous", "rotate_slow"] {
            assert!(reg.get(name, 1.0).is_ok(), "{name}");
        }
    }

    #[test]
    fn aliases_resolve_to_the_same_variant() {
        let effects = EffectRegistry::builtin();
        assert_eq!(
            effects.get("none", 1.0).unwrap().kind,
            effects.get("static", 1.0).unwrap().kind
        );
        assert_eq!(
            effects.get("breathing", 1.0).unwrap().kind,
            effects.get("zoom_in_out", 1.0).unwrap().kind
        );

        let transitions = TransitionRegistry::builtin();
        assert_eq!(
            transitions.get("fade", 0.5).unwrap().kind,
            transitions.get("cross_dissolve", 0.5).unwrap().kind
        );
        assert_eq!(
            transitions.get("flash", 0.5).unwrap().kind,
            transitions.get("flash_white", 0.5).unwrap().kind
        );
    }

    #[test]
    fn unknown_name_reports_available_names() {
        let reg = EffectRegistry::builtin();
        let err = reg.get("not_a_real_effect", 1.0).unwrap_err();
        match err {
            SlidereelError::Lookup {
                name, available, ..
            } => {
                assert_eq!(name, "not_a_real_effect");
                assert!(available.contains(&"static".to_string()));
            }
            other => panic!("expected lookup error, got {other}"),
        }
    }

    #[test]
    fn registration_is_idempotent() {
        let mut reg = EffectRegistry::builtin();
        let before = reg.list_available();
        reg.register("static", EffectKind::Static);
        assert_eq!(reg.list_available(), before);
    }

    #[test]
    fn listing_is_sorted_and_stable() {
        let names = TransitionRegistry::builtin().list_available();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 19);
    }
}

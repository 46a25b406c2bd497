use std::sync::Arc;

use crate::{
    effects::Effect,
    error::{SlidereelError, SlidereelResult},
    frame::{FrameRgb, FrameSize},
    model::ImageSpec,
    registry::{EffectRegistry, TransitionRegistry},
    transitions::Transition,
};

/// Display time granted to a trailing image when no previous gap exists to
/// copy. Matches the original service's hardcoded fallback.
pub const DEFAULT_LAST_SEGMENT_SECS: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct TimelineConfig {
    pub resolution: FrameSize,
    pub transition_type: String,
    pub transition_duration: f64,
}

/// One contiguous interval of the output timeline, backed by either a
/// single effect or a single transition. Sampled uniformly through
/// [`RenderSegment::frame_at`] regardless of kind.
#[derive(Clone, Debug)]
pub enum RenderSegment {
    Effect(EffectSegment),
    Transition(TransitionSegment),
}

#[derive(Clone, Debug)]
pub struct EffectSegment {
    pub effect: Effect,
    pub source: Arc<FrameRgb>,
    pub duration: f64,
    pub resolution: FrameSize,
}

#[derive(Clone, Debug)]
pub struct TransitionSegment {
    pub transition: Transition,
    /// Previous image's effect evaluated at progress 1.0.
    pub from: FrameRgb,
    /// Next image's effect evaluated at progress 0.0.
    pub to: FrameRgb,
    pub duration: f64,
}

impl RenderSegment {
    pub fn duration(&self) -> f64 {
        match self {
            Self::Effect(seg) => seg.duration,
            Self::Transition(seg) => seg.duration,
        }
    }

    /// Frame at `t` seconds into this segment. Progress is clamped to
    /// [0, 1]; a zero-length segment pins progress to 0.
    pub fn frame_at(&self, t: f64) -> SlidereelResult<FrameRgb> {
        let duration = self.duration();
        let progress = if duration > 0.0 {
            (t / duration).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self {
            Self::Effect(seg) => seg.effect.apply(&seg.source, progress, seg.resolution),
            Self::Transition(seg) => seg.transition.apply(&seg.from, &seg.to, progress),
        }
    }
}

/// Sum of emitted segment lengths.
pub fn total_duration(segments: &[RenderSegment]) -> f64 {
    segments.iter().map(RenderSegment::duration).sum()
}

/// Turn a sorted image sequence into the ordered list of renderable
/// segments.
///
/// Every effect and transition name is resolved up front, so an unknown
/// name fails before any frame is rendered. Each image then contributes an
/// effect segment covering its timestamp gap minus the transition window
/// (elided entirely when the gap does not exceed it), and every adjacent
/// pair contributes a transition segment between the pre-rendered endpoint
/// frames.
#[tracing::instrument(skip_all, fields(images = specs.len()))]
pub fn assemble_timeline(
    specs: &[ImageSpec],
    sources: &[Arc<FrameRgb>],
    effects: &EffectRegistry,
    transitions: &TransitionRegistry,
    config: &TimelineConfig,
) -> SlidereelResult<Vec<RenderSegment>> {
    if specs.len() < 2 {
        return Err(SlidereelError::validation(format!(
            "timeline needs at least 2 images, got {}",
            specs.len()
        )));
    }
    if sources.len() != specs.len() {
        return Err(SlidereelError::validation(format!(
            "{} decoded frames for {} image specs",
            sources.len(),
            specs.len()
        )));
    }
    if config.resolution.width == 0 || config.resolution.height == 0 {
        return Err(SlidereelError::validation(
            "output resolution must be > 0 in both dimensions",
        ));
    }
    for pair in specs.windows(2) {
        if pair[0].timestamp >= pair[1].timestamp {
            return Err(SlidereelError::validation(
                "image specs must be strictly ascending by timestamp",
            ));
        }
    }

    // Resolve every name first: lookup failures must surface before any
    // frame synthesis starts.
    let resolved_effects: Vec<Effect> = specs
        .iter()
        .map(|spec| effects.get(&spec.effect, spec.effect_intensity))
        .collect::<SlidereelResult<_>>()?;
    let resolved_transitions: Vec<Transition> = specs[..specs.len() - 1]
        .iter()
        .map(|spec| {
            let name = spec.transition.as_deref().unwrap_or(&config.transition_type);
            transitions.get(name, config.transition_duration)
        })
        .collect::<SlidereelResult<_>>()?;

    let transition_duration = config.transition_duration;
    let last = specs.len() - 1;
    let mut segments = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        let duration = if i < last {
            specs[i + 1].timestamp - spec.timestamp
        } else if i > 0 {
            spec.timestamp - specs[i - 1].timestamp
        } else {
            DEFAULT_LAST_SEGMENT_SECS
        };

        if duration > transition_duration {
            tracing::debug!(
                image = %spec.image_path.display(),
                effect = %spec.effect,
                duration = duration - transition_duration,
                "effect segment"
            );
            segments.push(RenderSegment::Effect(EffectSegment {
                effect: resolved_effects[i],
                source: Arc::clone(&sources[i]),
                duration: duration - transition_duration,
                resolution: config.resolution,
            }));
        }

        if i < last {
            let from = resolved_effects[i].apply(&sources[i], 1.0, config.resolution)?;
            let to = resolved_effects[i + 1].apply(&sources[i + 1], 0.0, config.resolution)?;
            tracing::debug!(
                from = %spec.image_path.display(),
                to = %specs[i + 1].image_path.display(),
                duration = transition_duration,
                "transition segment"
            );
            segments.push(RenderSegment::Transition(TransitionSegment {
                transition: resolved_transitions[i],
                from,
                to,
                duration: transition_duration,
            }));
        }
    }

    tracing::info!(
        segments = segments.len(),
        total_secs = total_duration(&segments),
        "timeline assembled"
    );
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(timestamp: f64, effect: &str) -> ImageSpec {
        ImageSpec {
            timestamp,
            image_path: PathBuf::from(format!("img_{timestamp}.png")),
            effect: effect.to_string(),
            effect_intensity: 1.0,
            transition: None,
        }
    }

    fn sources(n: usize) -> Vec<Arc<FrameRgb>> {
        (0..n)
            .map(|i| {
                Arc::new(FrameRgb::solid(
                    FrameSize::new(32, 24).unwrap(),
                    [(i * 40) as u8, 100, 200],
                ))
            })
            .collect()
    }

    fn config() -> TimelineConfig {
        TimelineConfig {
            resolution: FrameSize::new(16, 12).unwrap(),
            transition_type: "cross_dissolve".to_string(),
            transition_duration: 0.5,
        }
    }

    fn registries() -> (EffectRegistry, TransitionRegistry) {
        (EffectRegistry::builtin(), TransitionRegistry::builtin())
    }

    #[test]
    fn three_images_make_five_segments_totaling_8_5() {
        let specs = vec![spec(0.0, "static"), spec(3.0, "static"), spec(6.0, "static")];
        let (effects, transitions) = registries();
        let segments =
            assemble_timeline(&specs, &sources(3), &effects, &transitions, &config()).unwrap();

        assert_eq!(segments.len(), 5);
        let durations: Vec<f64> = segments.iter().map(RenderSegment::duration).collect();
        assert_eq!(durations, vec![2.5, 0.5, 2.5, 0.5, 2.5]);
        assert!((total_duration(&segments) - 8.5).abs() < 1e-9);

        assert!(matches!(segments[0], RenderSegment::Effect(_)));
        assert!(matches!(segments[1], RenderSegment::Transition(_)));
        assert!(matches!(segments[4], RenderSegment::Effect(_)));
    }

    #[test]
    fn short_gap_elides_the_effect_segment() {
        // Gap of 0.4s <= 0.5s transition: only the transition is emitted.
        let specs = vec![spec(0.0, "static"), spec(0.4, "static")];
        let (effects, transitions) = registries();
        let segments =
            assemble_timeline(&specs, &sources(2), &effects, &transitions, &config()).unwrap();

        assert!(matches!(segments[0], RenderSegment::Transition(_)));
        // Trailing image copies the 0.4s gap, minus nothing to transition into.
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn unknown_effect_fails_before_rendering() {
        let specs = vec![spec(0.0, "not_a_real_effect"), spec(3.0, "static")];
        let (effects, transitions) = registries();
        let err = assemble_timeline(&specs, &sources(2), &effects, &transitions, &config())
            .unwrap_err();
        assert!(matches!(err, SlidereelError::Lookup { .. }));
    }

    #[test]
    fn unknown_transition_override_fails() {
        let mut first = spec(0.0, "static");
        first.transition = Some("warp_core".to_string());
        let specs = vec![first, spec(3.0, "static")];
        let (effects, transitions) = registries();
        let err = assemble_timeline(&specs, &sources(2), &effects, &transitions, &config())
            .unwrap_err();
        assert!(matches!(err, SlidereelError::Lookup { .. }));
    }

    #[test]
    fn transition_override_replaces_the_global_type() {
        let mut first = spec(0.0, "static");
        first.transition = Some("wipe_left".to_string());
        let specs = vec![first, spec(3.0, "static"), spec(6.0, "static")];
        let (effects, transitions) = registries();
        let segments =
            assemble_timeline(&specs, &sources(3), &effects, &transitions, &config()).unwrap();

        let RenderSegment::Transition(first_tr) = &segments[1] else {
            panic!("expected transition at index 1");
        };
        let RenderSegment::Transition(second_tr) = &segments[3] else {
            panic!("expected transition at index 3");
        };
        assert_eq!(
            first_tr.transition.kind,
            crate::transitions::TransitionKind::Wipe(crate::transitions::WipeDirection::Left)
        );
        assert_eq!(
            second_tr.transition.kind,
            crate::transitions::TransitionKind::CrossDissolve
        );
    }

    #[test]
    fn single_image_is_rejected() {
        let specs = vec![spec(0.0, "static")];
        let (effects, transitions) = registries();
        let err = assemble_timeline(&specs, &sources(1), &effects, &transitions, &config())
            .unwrap_err();
        assert!(matches!(err, SlidereelError::Validation(_)));
    }

    #[test]
    fn frame_at_clamps_time_and_matches_resolution() {
        let specs = vec![spec(0.0, "pan_right"), spec(3.0, "zoom_in_continuous")];
        let (effects, transitions) = registries();
        let segments =
            assemble_timeline(&specs, &sources(2), &effects, &transitions, &config()).unwrap();

        for seg in &segments {
            for t in [-1.0, 0.0, seg.duration() / 2.0, seg.duration() + 5.0] {
                let frame = seg.frame_at(t).unwrap();
                assert_eq!(frame.size(), FrameSize::new(16, 12).unwrap());
            }
        }

        // Past-the-end sampling equals the final frame.
        let end = segments[0].frame_at(segments[0].duration()).unwrap();
        let beyond = segments[0].frame_at(segments[0].duration() * 10.0).unwrap();
        assert_eq!(end, beyond);
    }

    #[test]
    fn transition_endpoints_come_from_adjacent_effects() {
        let specs = vec![spec(0.0, "static"), spec(3.0, "static")];
        let (effects, transitions) = registries();
        let srcs = sources(2);
        let segments =
            assemble_timeline(&specs, &srcs, &effects, &transitions, &config()).unwrap();

        let RenderSegment::Transition(tr) = &segments[1] else {
            panic!("expected transition at index 1");
        };
        // Cross dissolve at the endpoints is exactly the prepared frames.
        let start = segments[1].frame_at(0.0).unwrap();
        let end = segments[1].frame_at(tr.duration).unwrap();
        assert_eq!(start, tr.from);
        assert_eq!(end, tr.to);
    }
}

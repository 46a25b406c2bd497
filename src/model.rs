use std::path::PathBuf;

use crate::{
    error::{SlidereelError, SlidereelResult},
    frame::FrameSize,
};

pub const DEFAULT_FPS: u32 = 30;
pub const MIN_FPS: u32 = 15;
pub const MAX_FPS: u32 = 60;
pub const DEFAULT_TRANSITION: &str = "cross_dissolve";
pub const DEFAULT_TRANSITION_SECS: f64 = 0.5;

/// One entry in the input sequence: a still image pinned to a timeline
/// position, with the motion effect covering its display interval and an
/// optional override for the transition into the next image.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageSpec {
    /// Timeline position in seconds; unique per well-formed request.
    pub timestamp: f64,
    pub image_path: PathBuf,
    #[serde(default = "default_effect")]
    pub effect: String,
    #[serde(default = "default_intensity")]
    pub effect_intensity: f64,
    /// Governs the transition into the *next* image when set; otherwise the
    /// request-level transition applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
}

fn default_effect() -> String {
    "static".to_string()
}

fn default_intensity() -> f64 {
    1.0
}

/// A full video generation request.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    pub images: Vec<ImageSpec>,
    pub output_path: PathBuf,
    #[serde(default = "default_transition")]
    pub transition_type: String,
    #[serde(default = "default_transition_secs")]
    pub transition_duration: f64,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_resolution")]
    pub resolution: FrameSize,
}

fn default_transition() -> String {
    DEFAULT_TRANSITION.to_string()
}

fn default_transition_secs() -> f64 {
    DEFAULT_TRANSITION_SECS
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_resolution() -> FrameSize {
    FrameSize {
        width: 1280,
        height: 720,
    }
}

impl RenderRequest {
    /// Sort images by timestamp (stable), then check every request
    /// invariant. Runs before any decoding or assembly; nothing is rendered
    /// when this fails.
    pub fn validate(&mut self) -> SlidereelResult<()> {
        if self.images.len() < 2 {
            return Err(SlidereelError::validation(format!(
                "at least 2 images are required, got {}",
                self.images.len()
            )));
        }

        for img in &self.images {
            if !img.timestamp.is_finite() || img.timestamp < 0.0 {
                return Err(SlidereelError::validation(format!(
                    "timestamp must be finite and non-negative, got {}",
                    img.timestamp
                )));
            }
            if !img.effect_intensity.is_finite() || img.effect_intensity < 0.0 {
                return Err(SlidereelError::validation(format!(
                    "effect intensity must be finite and >= 0, got {}",
                    img.effect_intensity
                )));
            }
            if img.image_path.as_os_str().is_empty() {
                return Err(SlidereelError::validation("image path must be non-empty"));
            }
        }

        self.images
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

        // Ties leave relative order undefined; reject rather than pick one.
        for pair in self.images.windows(2) {
            if pair[0].timestamp == pair[1].timestamp {
                return Err(SlidereelError::validation(format!(
                    "duplicate timestamp {} for '{}' and '{}'",
                    pair[0].timestamp,
                    pair[0].image_path.display(),
                    pair[1].image_path.display()
                )));
            }
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(SlidereelError::validation("output path must be non-empty"));
        }
        if !(MIN_FPS..=MAX_FPS).contains(&self.fps) {
            return Err(SlidereelError::validation(format!(
                "fps must be within {MIN_FPS}..={MAX_FPS}, got {}",
                self.fps
            )));
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(SlidereelError::validation(
                "resolution width/height must be > 0",
            ));
        }
        if !self.transition_duration.is_finite() || self.transition_duration <= 0.0 {
            return Err(SlidereelError::validation(
                "transition duration must be finite and > 0",
            ));
        }

        Ok(())
    }
}

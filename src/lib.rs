//! Slidereel renders a video by placing still images on a timeline,
//! applying a continuous motion effect (pan, zoom, rotation) across each
//! image's display interval, and blending adjacent images through short
//! transition animations.
//!
//! # Pipeline overview
//!
//! 1. **Validate**: [`RenderRequest::validate`] sorts the images by
//!    timestamp and checks every request invariant.
//! 2. **Assemble**: [`assemble_timeline`] resolves effect/transition names
//!    through the registries and produces an ordered list of
//!    [`RenderSegment`]s, each a pure function of elapsed time.
//! 3. **Sample**: the render driver calls [`RenderSegment::frame_at`] at
//!    the output frame rate for each segment in order.
//! 4. **Encode**: frames stream to the system `ffmpeg` binary for MP4
//!    output.
//!
//! Effect and transition `apply` calls are pure functions over their
//! explicit arguments, so frames can be sampled in parallel; the registries
//! are built once at startup and read-only afterwards.
#![forbid(unsafe_code)]

pub mod assets;
pub mod blur_cpu;
pub mod ease;
pub mod effects;
pub mod encode_ffmpeg;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod timeline;
pub mod transitions;

pub use assets::{decode_image, load_image};
pub use blur_cpu::box_blur_rgb8;
pub use ease::Ease;
pub use effects::{Effect, EffectKind};
pub use encode_ffmpeg::{EncodeConfig, FfmpegEncoder, ensure_parent_dir, is_ffmpeg_on_path};
pub use error::{SlidereelError, SlidereelResult};
pub use frame::{FrameRgb, FrameSize};
pub use geometry::Direction;
pub use model::{ImageSpec, RenderRequest};
pub use pipeline::{
    RenderReport, RenderThreading, encode_segments, frame_at_time, render_request,
    segment_frame_count,
};
pub use registry::{EffectRegistry, TransitionRegistry};
pub use timeline::{
    DEFAULT_LAST_SEGMENT_SECS, EffectSegment, RenderSegment, TimelineConfig, TransitionSegment,
    assemble_timeline, total_duration,
};
pub use transitions::{Transition, TransitionKind, WipeDirection, blend};

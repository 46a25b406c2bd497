use std::{path::Path, sync::Arc};

use rayon::prelude::*;

use crate::{
    assets,
    encode_ffmpeg::{EncodeConfig, FfmpegEncoder},
    error::{SlidereelError, SlidereelResult},
    frame::{FrameRgb, FrameSize},
    model::RenderRequest,
    registry::{EffectRegistry, TransitionRegistry},
    timeline::{self, RenderSegment, TimelineConfig},
};

#[derive(Clone, Debug)]
pub struct RenderThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Summary of a completed generation request.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RenderReport {
    pub output_path: std::path::PathBuf,
    pub duration_secs: f64,
    pub num_images: usize,
    pub num_segments: usize,
    pub frames_written: u64,
    pub fps: u32,
    pub resolution: FrameSize,
}

/// Number of output frames a segment of `duration` seconds contributes at
/// `fps`.
pub fn segment_frame_count(duration: f64, fps: u32) -> u64 {
    (duration * f64::from(fps)).round().max(0.0) as u64
}

/// Frame at global time `t` across the whole timeline, for previews. `t`
/// past the end is an error; `t` exactly at the end yields the final frame.
pub fn frame_at_time(segments: &[RenderSegment], t: f64) -> SlidereelResult<FrameRgb> {
    if segments.is_empty() {
        return Err(SlidereelError::validation("timeline has no segments"));
    }
    if !t.is_finite() || t < 0.0 {
        return Err(SlidereelError::validation(
            "preview time must be finite and >= 0",
        ));
    }

    let total = timeline::total_duration(segments);
    if t > total {
        return Err(SlidereelError::validation(format!(
            "preview time {t}s is beyond the timeline end ({total}s)"
        )));
    }

    let mut start = 0.0;
    for seg in segments {
        let end = start + seg.duration();
        if t < end {
            return seg.frame_at(t - start);
        }
        start = end;
    }
    // t == total: final frame of the last segment.
    let last = segments.last().expect("segments checked non-empty");
    last.frame_at(last.duration())
}

/// Run a full generation request: decode sources, assemble the timeline,
/// sample every segment at the output fps, and stream frames to ffmpeg.
///
/// On any failure the partially written output file is removed; either the
/// finished video exists or nothing does.
#[tracing::instrument(skip_all, fields(out = %request.output_path.display()))]
pub fn render_request(
    request: &mut RenderRequest,
    effects: &EffectRegistry,
    transitions: &TransitionRegistry,
    threading: &RenderThreading,
) -> SlidereelResult<RenderReport> {
    request.validate()?;
    tracing::info!(images = request.images.len(), "starting video generation");

    let mut sources = Vec::with_capacity(request.images.len());
    for img in &request.images {
        tracing::info!(image = %img.image_path.display(), effect = %img.effect, "loading image");
        sources.push(Arc::new(assets::load_image(&img.image_path)?));
    }

    let config = TimelineConfig {
        resolution: request.resolution,
        transition_type: request.transition_type.clone(),
        transition_duration: request.transition_duration,
    };
    let segments =
        timeline::assemble_timeline(&request.images, &sources, effects, transitions, &config)?;

    let frames_written = encode_segments(
        &segments,
        &request.output_path,
        request.fps,
        request.resolution,
        threading,
    )
    .inspect_err(|_| {
        let _ = std::fs::remove_file(&request.output_path);
    })?;

    let report = RenderReport {
        output_path: request.output_path.clone(),
        duration_secs: timeline::total_duration(&segments),
        num_images: request.images.len(),
        num_segments: segments.len(),
        frames_written,
        fps: request.fps,
        resolution: request.resolution,
    };
    tracing::info!(
        frames = report.frames_written,
        duration_secs = report.duration_secs,
        "video generated"
    );
    Ok(report)
}

/// Sample every segment in order at `fps` and feed the frames to the
/// encoder. Returns the number of frames written.
pub fn encode_segments(
    segments: &[RenderSegment],
    out_path: &Path,
    fps: u32,
    resolution: FrameSize,
    threading: &RenderThreading,
) -> SlidereelResult<u64> {
    if segments.is_empty() {
        return Err(SlidereelError::validation("no segments to encode"));
    }

    let mut encoder = FfmpegEncoder::new(EncodeConfig {
        width: resolution.width,
        height: resolution.height,
        fps,
        out_path: out_path.to_path_buf(),
        overwrite: true,
    })?;

    match stream_segments(segments, fps, threading, &mut encoder) {
        Ok(frames) => {
            encoder.finish()?;
            Ok(frames)
        }
        Err(e) => Err(e),
    }
}

fn stream_segments(
    segments: &[RenderSegment],
    fps: u32,
    threading: &RenderThreading,
    encoder: &mut FfmpegEncoder,
) -> SlidereelResult<u64> {
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };
    let chunk_size = threading.chunk_size.max(1) as u64;

    let mut written = 0u64;
    for segment in segments {
        let count = segment_frame_count(segment.duration(), fps);
        let mut chunk_start = 0u64;
        while chunk_start < count {
            let chunk_end = (chunk_start + chunk_size).min(count);
            let frames = sample_chunk(segment, chunk_start..chunk_end, fps, pool.as_ref())?;
            for frame in &frames {
                encoder.encode_frame(frame)?;
            }
            written += chunk_end - chunk_start;
            chunk_start = chunk_end;
        }
    }
    Ok(written)
}

fn sample_chunk(
    segment: &RenderSegment,
    range: std::ops::Range<u64>,
    fps: u32,
    pool: Option<&rayon::ThreadPool>,
) -> SlidereelResult<Vec<FrameRgb>> {
    let sample = |f: u64| segment.frame_at(f as f64 / f64::from(fps));

    match pool {
        Some(pool) => pool.install(|| {
            range
                .collect::<Vec<_>>()
                .par_iter()
                .map(|&f| sample(f))
                .collect::<SlidereelResult<Vec<_>>>()
        }),
        None => range.map(sample).collect(),
    }
}

fn build_thread_pool(threads: Option<usize>) -> SlidereelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SlidereelError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SlidereelError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageSpec;
    use std::path::PathBuf;

    fn build_segments() -> Vec<RenderSegment> {
        let specs = vec![
            ImageSpec {
                timestamp: 0.0,
                image_path: PathBuf::from("a.png"),
                effect: "static".to_string(),
                effect_intensity: 1.0,
                transition: None,
            },
            ImageSpec {
                timestamp: 2.0,
                image_path: PathBuf::from("b.png"),
                effect: "pan_right".to_string(),
                effect_intensity: 1.0,
                transition: None,
            },
        ];
        let sources = vec![
            Arc::new(FrameRgb::solid(FrameSize::new(24, 16).unwrap(), [250, 0, 0])),
            Arc::new(FrameRgb::solid(FrameSize::new(24, 16).unwrap(), [0, 250, 0])),
        ];
        timeline::assemble_timeline(
            &specs,
            &sources,
            &EffectRegistry::builtin(),
            &TransitionRegistry::builtin(),
            &TimelineConfig {
                resolution: FrameSize::new(12, 8).unwrap(),
                transition_type: "cross_dissolve".to_string(),
                transition_duration: 0.5,
            },
        )
        .unwrap()
    }

    #[test]
    fn frame_counts_follow_durations() {
        assert_eq!(segment_frame_count(2.5, 30), 75);
        assert_eq!(segment_frame_count(0.5, 30), 15);
        assert_eq!(segment_frame_count(0.0, 30), 0);
    }

    #[test]
    fn frame_at_time_walks_segments_in_order() {
        let segments = build_segments();
        // Timeline: effect 1.5s, transition 0.5s, effect 1.5s.
        let early = frame_at_time(&segments, 0.1).unwrap();
        assert_eq!(early.pixel(0, 0), [250, 0, 0]);

        let late = frame_at_time(&segments, 3.4).unwrap();
        assert_eq!(late.pixel(0, 0), [0, 250, 0]);

        // Mid-transition is a mix of both solid colors.
        let mid = frame_at_time(&segments, 1.75).unwrap();
        let px = mid.pixel(0, 0);
        assert!(px[0] > 0 && px[1] > 0);
    }

    #[test]
    fn frame_at_time_rejects_out_of_range() {
        let segments = build_segments();
        assert!(frame_at_time(&segments, -0.5).is_err());
        assert!(frame_at_time(&segments, 100.0).is_err());
        // Exactly at the end is the final frame.
        assert!(frame_at_time(&segments, 3.5).is_ok());
    }

    #[test]
    fn parallel_and_sequential_sampling_agree() {
        let segments = build_segments();
        let pool = build_thread_pool(Some(2)).unwrap();
        for segment in &segments {
            let seq = sample_chunk(segment, 0..8, 30, None).unwrap();
            let par = sample_chunk(segment, 0..8, 30, Some(&pool)).unwrap();
            assert_eq!(seq, par);
        }
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(build_thread_pool(Some(0)).is_err());
        assert!(build_thread_pool(None).is_ok());
    }
}

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render the frame at a single timeline instant as a PNG.
    Frame(FrameArgs),
    /// List registered effect names.
    ListEffects,
    /// List registered transition names.
    ListTransitions,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the request's output path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames sampled per chunk.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline instant in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::ListEffects => {
            for name in slidereel::EffectRegistry::builtin().list_available() {
                println!("{name}");
            }
            Ok(())
        }
        Command::ListTransitions => {
            for name in slidereel::TransitionRegistry::builtin().list_available() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn read_request_json(path: &Path) -> anyhow::Result<slidereel::RenderRequest> {
    let f = File::open(path).with_context(|| format!("open request '{}'", path.display()))?;
    let r = BufReader::new(f);
    let request: slidereel::RenderRequest =
        serde_json::from_reader(r).with_context(|| "parse request JSON")?;
    Ok(request)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut request = read_request_json(&args.in_path)?;
    if let Some(out) = args.out {
        request.output_path = out;
    }

    let effects = slidereel::EffectRegistry::builtin();
    let transitions = slidereel::TransitionRegistry::builtin();
    let threading = slidereel::RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };

    let report = slidereel::render_request(&mut request, &effects, &transitions, &threading)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut request = read_request_json(&args.in_path)?;
    request.validate()?;

    let effects = slidereel::EffectRegistry::builtin();
    let transitions = slidereel::TransitionRegistry::builtin();

    let mut sources = Vec::with_capacity(request.images.len());
    for img in &request.images {
        sources.push(std::sync::Arc::new(slidereel::load_image(&img.image_path)?));
    }

    let config = slidereel::TimelineConfig {
        resolution: request.resolution,
        transition_type: request.transition_type.clone(),
        transition_duration: request.transition_duration,
    };
    let segments = slidereel::assemble_timeline(
        &request.images,
        &sources,
        &effects,
        &transitions,
        &config,
    )?;

    let frame = slidereel::frame_at_time(&segments, args.time)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

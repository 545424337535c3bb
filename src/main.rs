use anyhow::{Context, Result};
use clap::Parser;
use framenorm::array::{self, FrameStack};
use framenorm::cli::{ArrayToVideoArgs, Args, Command, NormalizeArgs, VideoToArrayArgs};
use framenorm::config::NormalizeJob;
use framenorm::pipeline::Pipeline;
use framenorm::render::DirectorySink;
use framenorm::video;
use ndarray::Ix3;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match &args.command {
        Command::Normalize(a) => normalize(a),
        Command::VideoToArray(a) => video_to_array(a),
        Command::ArrayToVideo(a) => array_to_video(a),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Normalize every frame of an array, render the frames, optionally save the array
fn normalize(args: &NormalizeArgs) -> Result<()> {
    // Stage 1: Resolve configuration before touching the filesystem
    let job = NormalizeJob::try_from(args)?;

    // Stage 2: Make sure the image directory exists
    std::fs::create_dir_all(&job.output_dir).with_context(|| {
        format!("failed to create output dir: {}", job.output_dir.display())
    })?;

    // Stage 3: Load the frame sequence
    let stack = array::read_npy(&job.input_file)?;

    // Stage 4: Normalize and render on the worker pool
    let sink = DirectorySink::new(&job.output_dir, job.pipeline.frame_format());
    let output = Pipeline::new(job.pipeline).run(stack.view(), &sink)?;

    // Stage 5: Persist the combined array, only after a complete run
    if let Some(path) = &job.output_file {
        array::write_npy(path, output.frames.view())?;
    }

    Ok(())
}

fn video_to_array(args: &VideoToArrayArgs) -> Result<()> {
    let frames = video::decode_video(&args.filename)?;
    let out_path = args
        .output_file
        .clone()
        .unwrap_or_else(|| video::default_array_path(&args.filename));
    array::write_npy(&out_path, frames.view().into_dyn())?;
    Ok(())
}

fn array_to_video(args: &ArrayToVideoArgs) -> Result<()> {
    let stack: FrameStack = array::read_npy(&args.input_file)?;
    let frames = stack
        .to_u8()
        .into_dimensionality::<Ix3>()
        .with_context(|| {
            format!(
                "expected an array of shape frames x rows x cols in {}",
                args.input_file.display()
            )
        })?;

    let cfg = video::VideoEncodeConfig::new(&args.output_file).with_fps(args.fps);
    video::encode_video(frames.view(), &cfg)
}

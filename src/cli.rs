use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::normalize::DegeneratePolicy;
use crate::render::FrameFormat;

/// Normalize frame sequences and convert between videos and frame arrays
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Rescale every frame of a .npy array to 0-255 and save each as an image
    Normalize(NormalizeArgs),

    /// Convert a video file to a .npy array of grayscale frames
    VideoToArray(VideoToArrayArgs),

    /// Convert a .npy array of frames to a video file
    ArrayToVideo(ArrayToVideoArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// .npy array of shape frames x rows x cols
    #[arg(short = 'i', long = "input-file", alias = "inputFile", value_name = "FILE")]
    pub input_file: PathBuf,

    /// Directory for the frame images, created if it does not exist
    #[arg(short = 'o', long = "output-dir", alias = "outputDir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Save the normalized uint8 array to this .npy file
    #[arg(long = "output-file", alias = "outputFile", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Worker threads [default: available parallelism]
    #[arg(
        short = 'n',
        long = "num-workers",
        aliases = ["numWorkers", "numProcessors"],
        value_name = "N"
    )]
    pub num_workers: Option<usize>,

    /// How to handle frames whose pixels all have the same value
    #[arg(long, value_enum, default_value_t = ConstantFrameArg::Reject)]
    pub on_constant_frame: ConstantFrameArg,

    /// Image format of the rendered frames
    #[arg(long, value_enum, default_value_t = ImageFormatArg::Png)]
    pub image_format: ImageFormatArg,
}

#[derive(clap::Args, Debug, Clone)]
pub struct VideoToArrayArgs {
    /// Video file to decode
    #[arg(short = 'f', long = "filename", value_name = "FILE")]
    pub filename: PathBuf,

    /// Output .npy path [default: input path with .npy extension]
    #[arg(short = 'o', long = "output-file", alias = "outputFile", value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ArrayToVideoArgs {
    /// .npy array of shape frames x rows x cols
    #[arg(short = 'i', long = "input-file", alias = "inputFile", value_name = "FILE")]
    pub input_file: PathBuf,

    /// Video file to write
    #[arg(short = 'o', long = "output-file", alias = "outputFile", value_name = "FILE")]
    pub output_file: PathBuf,

    /// Frames per second of the written video
    #[arg(long, default_value_t = crate::video::DEFAULT_FPS)]
    pub fps: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantFrameArg {
    /// Abort the run
    Reject,
    /// Write an all-zero frame
    Zero,
}

impl From<ConstantFrameArg> for DegeneratePolicy {
    fn from(arg: ConstantFrameArg) -> Self {
        match arg {
            ConstantFrameArg::Reject => Self::Reject,
            ConstantFrameArg::Zero => Self::ZeroFill,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormatArg {
    Png,
    Tiff,
    Bmp,
}

impl From<ImageFormatArg> for FrameFormat {
    fn from(arg: ImageFormatArg) -> Self {
        match arg {
            ImageFormatArg::Png => Self::Png,
            ImageFormatArg::Tiff => Self::Tiff,
            ImageFormatArg::Bmp => Self::Bmp,
        }
    }
}

//! Typed run configuration resolved from command-line arguments

use std::path::{Path, PathBuf};

use crate::cli::NormalizeArgs;
use crate::pipeline::{PipelineConfig, PipelineError, default_worker_count};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("invalid configuration: {option} must not be empty")]
    EmptyPath { option: &'static str },

    #[error("invalid configuration: output file {} is a directory", .0.display())]
    OutputFileIsDirectory(PathBuf),

    #[error("invalid configuration: output dir {} exists and is not a directory", .0.display())]
    OutputDirIsFile(PathBuf),
}

/// Everything the `normalize` command needs, validated up front
#[derive(Debug, Clone)]
pub struct NormalizeJob {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

fn non_empty(path: &Path, option: &'static str) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath { option });
    }
    Ok(())
}

impl TryFrom<&NormalizeArgs> for NormalizeJob {
    type Error = ConfigError;

    fn try_from(args: &NormalizeArgs) -> Result<Self, Self::Error> {
        non_empty(&args.input_file, "input file")?;
        non_empty(&args.output_dir, "output dir")?;
        if args.output_dir.exists() && !args.output_dir.is_dir() {
            return Err(ConfigError::OutputDirIsFile(args.output_dir.clone()));
        }
        if let Some(output_file) = &args.output_file {
            non_empty(output_file, "output file")?;
            if output_file.is_dir() {
                return Err(ConfigError::OutputFileIsDirectory(output_file.clone()));
            }
        }

        let pipeline = match args.num_workers {
            Some(n) => PipelineConfig::new(n)?,
            None => PipelineConfig::with_workers(default_worker_count()),
        }
        .with_degenerate_policy(args.on_constant_frame.into())
        .with_frame_format(args.image_format.into());

        Ok(Self {
            input_file: args.input_file.clone(),
            output_dir: args.output_dir.clone(),
            output_file: args.output_file.clone(),
            pipeline,
        })
    }
}

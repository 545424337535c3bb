//! Parallel normalization pipeline
//!
//! The frame axis of the input is split into one task per frame. Tasks run on
//! a fixed-size worker pool, each normalizing and rendering its frame, and the
//! results are reassembled by frame index into an output array with the same
//! shape as the input.

mod assembler;
mod error;
mod scheduler;
mod task;

// Re-export public API
pub use assembler::ResultAssembler;
pub use error::PipelineError;
pub use scheduler::{Pipeline, PipelineConfig, RunOutput, RunStats, default_worker_count};
pub use task::{FrameResult, FrameTask, build_tasks};

pub mod array;
pub mod cli;
pub mod config;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod types;
pub mod video;

// Re-export commonly used items
pub use array::{FrameStack, read_npy, write_npy};
pub use normalize::{DegeneratePolicy, FrameError, normalize_frame};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError};
pub use render::{DirectorySink, FrameFormat, FrameRenderer, FrameSink, OutputWriteError};

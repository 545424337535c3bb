use crate::normalize::FrameError;
use crate::render::OutputWriteError;
use crate::types::format_shape;

/// Errors that abort a normalization run
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("expected an array of shape frames x rows x cols, got shape {}", format_shape(.shape))]
    InvalidShape { shape: Vec<usize> },

    #[error("frame {index}: {cause}")]
    Frame { index: usize, cause: FrameError },

    #[error("frame {index}: {cause}")]
    Output {
        index: usize,
        cause: OutputWriteError,
    },

    #[error("incomplete run: {received} of {expected} frames were produced")]
    IncompleteRun { expected: usize, received: usize },

    #[error("result assembly failed: {0}")]
    Assembly(String),

    #[error("worker pool failure: {0}")]
    WorkerPool(String),
}

impl PipelineError {
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        Self::Assembly(msg.into())
    }

    pub fn worker_pool(msg: impl Into<String>) -> Self {
        Self::WorkerPool(msg.into())
    }

    /// Index of the frame that caused the failure, if a single frame did
    #[must_use]
    pub fn frame_index(&self) -> Option<usize> {
        match self {
            Self::Frame { index, .. } | Self::Output { index, .. } => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_messages_name_frame_and_cause() {
        let err = PipelineError::Frame {
            index: 1,
            cause: FrameError::DegenerateFrame { value: 10.0 },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("frame 1: degenerate frame"));
        assert!(msg.contains("10"));
        assert_eq!(err.frame_index(), Some(1));

        let err = PipelineError::Output {
            index: 12,
            cause: OutputWriteError::MissingDirectory(PathBuf::from("/nope")),
        };
        assert_eq!(err.to_string(), "frame 12: output directory /nope does not exist");
        assert_eq!(err.frame_index(), Some(12));
    }

    #[test]
    fn test_run_level_messages() {
        let err = PipelineError::IncompleteRun {
            expected: 5,
            received: 3,
        };
        assert_eq!(err.to_string(), "incomplete run: 3 of 5 frames were produced");
        assert_eq!(err.frame_index(), None);

        let err = PipelineError::InvalidShape { shape: vec![7] };
        assert!(err.to_string().ends_with("got shape (7,)"));

        assert!(
            PipelineError::invalid_configuration("x")
                .to_string()
                .contains("invalid configuration:")
        );
    }
}

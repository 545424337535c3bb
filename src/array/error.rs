use std::path::PathBuf;

use crate::types::format_shape;

/// Errors raised while reading or writing `.npy` frame sequences
#[derive(thiserror::Error, Debug)]
pub enum ArrayError {
    #[error("failed to access array file {}: {cause}", .path.display())]
    Io { path: PathBuf, cause: std::io::Error },

    #[error("not a NumPy array file (bad magic string)")]
    BadMagic,

    #[error("unsupported .npy format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("malformed .npy header: {0}")]
    MalformedHeader(String),

    #[error("unsupported array element type '{0}'")]
    UnsupportedDtype(String),

    #[error("array data truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("expected an array of shape frames x rows x cols, got shape {}", format_shape(.shape))]
    Rank { shape: Vec<usize> },
}

impl ArrayError {
    pub fn io(path: impl Into<PathBuf>, cause: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            cause,
        }
    }

    pub fn header(msg: impl Into<String>) -> Self {
        Self::MalformedHeader(msg.into())
    }
}

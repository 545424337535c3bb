//! Conversion between video files and frame arrays
//!
//! Decoding and encoding are delegated to the system `ffmpeg` and `ffprobe`
//! binaries; this module only moves raw pixels between them and `ndarray`.

mod decode;
mod encode;
mod probe;

// Re-export public API
pub use decode::{decode_video, green_channel_frames};
pub use encode::{DEFAULT_FPS, VideoEncodeConfig, VideoEncoder, encode_video};
pub use probe::{VideoInfo, is_ffmpeg_on_path, is_ffprobe_on_path, probe_video};

use std::path::{Path, PathBuf};

/// Default array path for a movie: same location, `.npy` extension
#[must_use]
pub fn default_array_path(video: &Path) -> PathBuf {
    video.with_extension("npy")
}

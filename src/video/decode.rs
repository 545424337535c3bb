use anyhow::{Context, Result, bail};
use ndarray::Array3;
use std::path::Path;
use std::process::Command;

use super::probe::probe_video;

/// Index of the channel kept from each RGB pixel
const GREEN: usize = 1;

/// Decode every frame of a video into a `(frames, rows, cols)` array.
///
/// Frames are decoded by the system `ffmpeg` as packed RGB. Only the green
/// channel is kept, which for grayscale sources equals the luminance.
pub fn decode_video(path: &Path) -> Result<Array3<u8>> {
    let info = probe_video(path)?;
    tracing::info!(
        path = %path.display(),
        width = info.width,
        height = info.height,
        frames = ?info.frame_count,
        "decoding video"
    );

    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
        .output()
        .context("failed to run ffmpeg for video decode (is it installed and on PATH?)")?;

    if !out.status.success() {
        bail!(
            "ffmpeg video decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    let frames = green_channel_frames(&out.stdout, info.width as usize, info.height as usize)?;
    if let Some(expected) = info.frame_count
        && expected != frames.len_of(ndarray::Axis(0)) as u64
    {
        tracing::warn!(
            expected,
            decoded = frames.len_of(ndarray::Axis(0)),
            "decoded frame count differs from container metadata"
        );
    }
    Ok(frames)
}

/// Split packed RGB24 frames and keep the green channel of each pixel
pub fn green_channel_frames(rgb: &[u8], width: usize, height: usize) -> Result<Array3<u8>> {
    let frame_len = width * height * 3;
    if frame_len == 0 {
        bail!("decoded video frame size is zero (invalid source dimensions)");
    }
    if !rgb.len().is_multiple_of(frame_len) {
        bail!(
            "decoded video has invalid size: got {} bytes, expected a multiple of {frame_len}",
            rgb.len()
        );
    }

    let frames = rgb.len() / frame_len;
    let gray: Vec<u8> = rgb.chunks_exact(3).map(|px| px[GREEN]).collect();
    Array3::from_shape_vec((frames, height, width), gray)
        .context("decoded pixels do not match the video dimensions")
}

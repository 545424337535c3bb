use anyhow::{Context, Result, bail, ensure};
use ndarray::{ArrayView2, ArrayView3, Axis};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use super::probe::is_ffmpeg_on_path;

/// Frame rate written when none is requested
pub const DEFAULT_FPS: u32 = 10;

#[derive(Clone, Debug)]
pub struct VideoEncodeConfig {
    pub out_path: PathBuf,
    pub fps: u32,
    pub overwrite: bool,
}

impl VideoEncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            fps: DEFAULT_FPS,
            overwrite: true,
        }
    }

    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.fps > 0, "video fps must be non-zero");
        Ok(())
    }
}

/// Streams grayscale frames into a raw I420 video via the system `ffmpeg`
pub struct VideoEncoder {
    width: usize,
    height: usize,
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl VideoEncoder {
    pub fn new(cfg: &VideoEncodeConfig, width: usize, height: usize) -> Result<Self> {
        cfg.validate()?;
        ensure!(width > 0 && height > 0, "video frames must have non-zero size");

        if !cfg.overwrite && cfg.out_path.exists() {
            bail!("output file '{}' already exists", cfg.out_path.display());
        }
        if !is_ffmpeg_on_path() {
            bail!("ffmpeg is required for video encoding, but was not found on PATH");
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "gray",
            "-s",
            &format!("{width}x{height}"),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "rawvideo",
            "-pix_fmt",
            "yuv420p",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd
            .spawn()
            .context("failed to spawn ffmpeg (is it installed and on PATH?)")?;
        let stdin = child
            .stdin
            .take()
            .context("failed to open ffmpeg stdin")?;

        Ok(Self {
            width,
            height,
            child,
            stdin: Some(stdin),
            scratch: Vec::with_capacity(width * height),
        })
    }

    pub fn encode_frame(&mut self, frame: ArrayView2<'_, u8>) -> Result<()> {
        let (rows, cols) = frame.dim();
        if rows != self.height || cols != self.width {
            bail!(
                "frame size mismatch: got {cols}x{rows}, expected {}x{}",
                self.width,
                self.height
            );
        }

        self.scratch.clear();
        self.scratch.extend(frame.iter().copied());

        let Some(stdin) = self.stdin.as_mut() else {
            bail!("video encoder is already finalized");
        };
        stdin
            .write_all(&self.scratch)
            .context("failed to write frame to ffmpeg stdin")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .context("failed to wait for ffmpeg to finish")?;
        if !output.status.success() {
            bail!(
                "ffmpeg exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Write a `(frames, rows, cols)` array as a video file
pub fn encode_video(frames: ArrayView3<'_, u8>, cfg: &VideoEncodeConfig) -> Result<()> {
    let (count, rows, cols) = frames.dim();
    tracing::info!(
        path = %cfg.out_path.display(),
        frames = count,
        fps = cfg.fps,
        "encoding video"
    );

    let mut encoder = VideoEncoder::new(cfg, cols, rows)?;
    for (index, frame) in frames.axis_iter(Axis(0)).enumerate() {
        if let Err(err) = encoder.encode_frame(frame) {
            let err = err.context(format!("failed to encode frame {index}"));
            // Reap ffmpeg; a broken pipe usually means it already exited with an error
            return Err(match encoder.finish() {
                Ok(()) => err,
                Err(ffmpeg) => err.context(format!("{ffmpeg:#}")),
            });
        }
    }
    encoder
        .finish()
        .with_context(|| format!("failed to write video '{}'", cfg.out_path.display()))
}

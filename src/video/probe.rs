use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};

/// Basic stream information reported by `ffprobe`
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Container-reported frame count; not every container records one
    pub frame_count: Option<u64>,
    pub fps: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
}

fn tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn is_ffmpeg_on_path() -> bool {
    tool_on_path("ffmpeg")
}

pub fn is_ffprobe_on_path() -> bool {
    tool_on_path("ffprobe")
}

/// Query dimensions and frame rate of the first video stream in `path`
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-print_format",
            "json",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .context("failed to run ffprobe (is it installed and on PATH?)")?;

    if !out.status.success() {
        bail!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    parse_probe_output(&out.stdout)
        .with_context(|| format!("unexpected ffprobe output for '{}'", path.display()))
}

pub(crate) fn parse_probe_output(json: &[u8]) -> Result<VideoInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json).context("ffprobe json parse failed")?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .context("no video stream found")?;

    let width = stream.width.context("missing video width")?;
    let height = stream.height.context("missing video height")?;
    if width == 0 || height == 0 {
        bail!("video stream has zero size ({width}x{height})");
    }

    Ok(VideoInfo {
        width,
        height,
        frame_count: stream.nb_frames.as_deref().and_then(|n| n.parse().ok()),
        fps: stream.r_frame_rate.as_deref().and_then(parse_ratio),
    })
}

/// Parse an ffmpeg rational such as `30000/1001`
fn parse_ratio(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0).then(|| num / den)
}

use crate::config::ToolOptions;
use crate::error::PreviewError;
use crate::ffmpeg::run_tool;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;

#[derive(Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    streams: Option<Vec<ProbeStream>>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    nb_read_frames: Option<String>,
}

/// Frame rate, frame count and size of the first video stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoGeometry {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub frame_count: u64,
}

impl VideoGeometry {
    /// Always finite: probing rejects a zero frame rate.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.frame_rate
    }
}

async fn ffprobe_json(path: &Path, args: &[&str], tools: &ToolOptions) -> Result<ProbeOutput, PreviewError> {
    let mut full_args: Vec<&OsStr> = vec![OsStr::new("-v"), OsStr::new("error")];
    full_args.extend(args.iter().map(OsStr::new));
    full_args.extend([OsStr::new("-of"), OsStr::new("json"), path.as_os_str()]);

    let output = run_tool(&tools.ffprobe, &full_args, tools)
        .await
        .map_err(|e| PreviewError::probe(path, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PreviewError::probe(
            path,
            format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| PreviewError::probe(path, format!("unreadable ffprobe output: {e}")))
}

/// Container duration in seconds, as reported by `format=duration`.
pub async fn probe_media_duration(path: &Path, tools: &ToolOptions) -> Result<f64, PreviewError> {
    let probe = ffprobe_json(path, &["-show_entries", "format=duration"], tools).await?;
    let raw = probe
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| PreviewError::probe(path, "no duration reported"))?;

    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| PreviewError::probe(path, format!("unparsable duration `{raw}`")))
}

/// Probes the first video stream. When the container carries no frame count
/// the stream is decoded in full to count frames.
pub async fn probe_video_geometry(path: &Path, tools: &ToolOptions) -> Result<VideoGeometry, PreviewError> {
    const ENTRIES: &str = "stream=width,height,r_frame_rate,avg_frame_rate,nb_frames";

    let probe = ffprobe_json(path, &["-select_streams", "v:0", "-show_entries", ENTRIES], tools).await?;
    let stream = first_stream(path, probe)?;

    let width = stream.width.filter(|&w| w > 0);
    let height = stream.height.filter(|&h| h > 0);
    let (Some(width), Some(height)) = (width, height) else {
        return Err(PreviewError::probe(path, "video stream has no dimensions"));
    };

    let frame_rate = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .ok_or_else(|| PreviewError::probe(path, "frame rate is zero or missing"))?;

    let frame_count = match stream.nb_frames.as_deref().and_then(parse_count) {
        Some(count) => count,
        None => count_frames(path, tools).await?,
    };
    if frame_count == 0 {
        return Err(PreviewError::probe(path, "video stream has no frames"));
    }

    Ok(VideoGeometry {
        width,
        height,
        frame_rate,
        frame_count,
    })
}

async fn count_frames(path: &Path, tools: &ToolOptions) -> Result<u64, PreviewError> {
    let args = [
        "-count_frames",
        "-select_streams",
        "v:0",
        "-show_entries",
        "stream=nb_read_frames",
    ];
    let probe = ffprobe_json(path, &args, tools).await?;
    first_stream(path, probe)?
        .nb_read_frames
        .as_deref()
        .and_then(parse_count)
        .ok_or_else(|| PreviewError::probe(path, "could not count frames"))
}

fn first_stream(path: &Path, probe: ProbeOutput) -> Result<ProbeStream, PreviewError> {
    probe
        .streams
        .and_then(|s| s.into_iter().next())
        .ok_or_else(|| PreviewError::probe(path, "no video stream"))
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|&n| n > 0)
}

/// Parses `"30/1"`, `"30000/1001"` or a plain decimal. Zero, negative and
/// `0/0` rates yield `None`.
pub(crate) fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_fraction() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 1e-9);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("24").unwrap() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn frame_rate_rejects_zero() {
        assert!(parse_frame_rate("0/0").is_none());
        assert!(parse_frame_rate("30/0").is_none());
        assert!(parse_frame_rate("0/1").is_none());
        assert!(parse_frame_rate("fast").is_none());
    }

    #[test]
    fn geometry_duration() {
        let g = VideoGeometry {
            width: 1080,
            height: 1920,
            frame_rate: 24.0,
            frame_count: 120,
        };
        assert!((g.duration_secs() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn deserializes_ffprobe_stream_json() {
        let json = r#"{"programs":[],"streams":[{"width":1920,"height":1080,
            "r_frame_rate":"24/1","avg_frame_rate":"24/1","nb_frames":"120"}]}"#;
        let probe: ProbeOutput = serde_json::from_str(json).unwrap();
        let stream = first_stream(Path::new("a.mp4"), probe).unwrap();
        assert_eq!(stream.nb_frames.as_deref().and_then(parse_count), Some(120));
        assert_eq!(stream.width, Some(1920));
    }

    #[test]
    fn deserializes_ffprobe_format_json() {
        let json = r#"{"format":{"duration":"3.000000"}}"#;
        let probe: ProbeOutput = serde_json::from_str(json).unwrap();
        assert_eq!(probe.format.unwrap().duration.as_deref(), Some("3.000000"));
    }

    #[tokio::test]
    async fn missing_ffprobe_is_probe_error() {
        let tools = ToolOptions {
            ffprobe: "/nonexistent/ffprobe-missing".into(),
            ..ToolOptions::default()
        };
        let err = probe_media_duration(Path::new("song.mp3"), &tools)
            .await
            .unwrap_err();
        assert!(matches!(err, PreviewError::Probe { .. }), "{err}");
    }
}

use crate::config::ToolOptions;
use crate::error::PreviewError;
use crate::ffmpeg::ffmpeg_stdout;
use crate::ffprobe::{VideoGeometry, probe_video_geometry};
use image::{DynamicImage, ImageFormat};
use log::debug;
use std::path::{Path, PathBuf};

/// Anything the screenshot sampler can pull individual frames from.
pub trait FrameSource {
    /// Total number of frames; sampling covers `0..frame_count()`.
    fn frame_count(&self) -> u64;

    /// Seeks to `index` and decodes exactly that frame.
    fn decode_frame(
        &self,
        index: u64,
    ) -> impl Future<Output = Result<DynamicImage, PreviewError>>;
}

/// Decode handle for one source recording. The geometry is probed once when
/// the handle is opened and reused for loop planning and frame sampling for
/// the rest of the device job.
#[derive(Debug)]
pub struct VideoSource {
    path: PathBuf,
    geometry: VideoGeometry,
    tools: ToolOptions,
}

impl VideoSource {
    pub async fn open(path: &Path, tools: &ToolOptions) -> Result<Self, PreviewError> {
        let geometry = probe_video_geometry(path, tools).await?;
        debug!(
            "opened {}: {}x{} @ {:.3} fps, {} frames",
            path.display(),
            geometry.width,
            geometry.height,
            geometry.frame_rate,
            geometry.frame_count
        );
        Ok(Self {
            path: path.to_path_buf(),
            geometry,
            tools: tools.clone(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn geometry(&self) -> &VideoGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.geometry.duration_secs()
    }
}

/// Arguments that make ffmpeg emit frame `index` as a single PNG on stdout.
///
/// The input-side `-ss` lands half a frame before `index`. ffmpeg jumps to the
/// preceding keyframe and discards decoded frames up to that point, so the
/// first frame it outputs is `index` on a constant-rate source and only the
/// current GOP is decoded.
pub(crate) fn frame_extract_args(input: &Path, index: u64, frame_rate: f64) -> Vec<String> {
    let mut args: Vec<String> = vec!["-hide_banner".into(), "-nostdin".into(), "-v".into(), "error".into()];
    if index > 0 {
        let seek = (index as f64 - 0.5) / frame_rate;
        args.extend(["-ss".into(), format!("{seek:.6}")]);
    }
    args.extend([
        "-i".into(),
        input.to_string_lossy().to_string(),
        "-map".into(),
        "0:v:0".into(),
        "-fps_mode".into(),
        "passthrough".into(),
        "-frames:v".into(),
        "1".into(),
        "-an".into(),
        "-f".into(),
        "image2pipe".into(),
        "-c:v".into(),
        "png".into(),
        "pipe:1".into(),
    ]);
    args
}

impl FrameSource for VideoSource {
    fn frame_count(&self) -> u64 {
        self.geometry.frame_count
    }

    async fn decode_frame(&self, index: u64) -> Result<DynamicImage, PreviewError> {
        if index >= self.geometry.frame_count {
            return Err(PreviewError::Decode {
                frame: index,
                reason: format!("past the end ({} frames)", self.geometry.frame_count),
            });
        }

        let args = frame_extract_args(&self.path, index, self.geometry.frame_rate);
        let png = ffmpeg_stdout(&args, &self.tools)
            .await
            .map_err(|e| PreviewError::Decode {
                frame: index,
                reason: e.to_string(),
            })?;
        if png.is_empty() {
            return Err(PreviewError::Decode {
                frame: index,
                reason: "ffmpeg produced no frame".into(),
            });
        }

        image::load_from_memory_with_format(&png, ImageFormat::Png).map_err(|e| {
            PreviewError::Decode {
                frame: index,
                reason: e.to_string(),
            }
        })
    }
}

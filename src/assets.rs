pub mod batch;
pub mod preview_video;
pub mod screenshots;

use crate::config::PreviewOptions;
use crate::error::PreviewError;
use crate::ffprobe::probe_media_duration;
use crate::loop_plan::LoopPlan;
use crate::profiles::DeviceProfile;
use crate::video_source::VideoSource;
use log::info;
use preview_video::encode_preview;
use screenshots::{ScreenshotSet, capture_screenshots};
use std::path::{Path, PathBuf};

/// Inputs and destination for one device's assets.
#[derive(Clone, Debug)]
pub struct JobSpec {
    pub input_video: PathBuf,
    pub audio: PathBuf,
    pub profile: DeviceProfile,
    pub output_dir: PathBuf,
}

impl JobSpec {
    /// `{output}/{device}_preview.mp4`
    #[must_use]
    pub fn preview_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_preview.mp4", self.profile.device.id()))
    }

    /// `{output}/{device}_screenshots`
    #[must_use]
    pub fn screenshots_dir(&self) -> PathBuf {
        screenshots_dir(&self.output_dir, &self.profile)
    }
}

pub(crate) fn screenshots_dir(output_dir: &Path, profile: &DeviceProfile) -> PathBuf {
    output_dir.join(format!("{}_screenshots", profile.device.id()))
}

/// Everything produced for one device.
#[derive(Clone, Debug)]
pub struct DeviceAssets {
    pub loop_plan: LoopPlan,
    pub preview: PathBuf,
    pub screenshots: ScreenshotSet,
}

/// Runs the full pipeline for one device: probe both inputs, plan loops,
/// encode the preview, then sample screenshots from the original recording.
///
/// The recording's decode handle is opened once and released when this
/// function returns, on success or error.
pub async fn generate_device_assets(
    job: &JobSpec,
    options: &PreviewOptions,
) -> Result<DeviceAssets, PreviewError> {
    let source = VideoSource::open(&job.input_video, &options.tools).await?;
    let video_secs = source.duration_secs();
    let audio_secs = probe_media_duration(&job.audio, &options.tools).await?;

    let target = options.target_duration_secs();
    let loop_plan = LoopPlan::new(target, video_secs, audio_secs)?;
    info!(
        "Video duration: {video_secs:.2}s (looping {} times)",
        loop_plan.video_loop_count
    );
    info!(
        "Audio duration: {audio_secs:.2}s (looping {} times)",
        loop_plan.audio_loop_count
    );

    let preview = encode_preview(job, &loop_plan, options).await?;

    let screenshots = capture_screenshots(
        &source,
        job.profile.device,
        options.screenshot_count(),
        job.profile.screenshot_resolution,
        &job.screenshots_dir(),
        options.jpeg_quality,
    )
    .await?;

    Ok(DeviceAssets {
        loop_plan,
        preview,
        screenshots,
    })
}

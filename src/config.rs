use crate::error::PreviewError;
use crate::profiles::{DeviceProfile, Preset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const PRESET_ENV: &str = "PREVIEW_PRESET";
pub const FFMPEG_ENV: &str = "FFMPEG_PATH";
pub const FFPROBE_ENV: &str = "FFPROBE_PATH";
pub const TIMEOUT_ENV: &str = "PREVIEW_PROCESS_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30 * 60;

/// Paths and limits for the external ffmpeg tools.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolOptions {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    /// Upper bound for any single ffmpeg/ffprobe invocation.
    pub timeout_secs: u64,
}

impl ToolOptions {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Complete configuration for one run. Built once, then shared by reference
/// with every device job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreviewOptions {
    pub preset: Preset,
    /// Devices to process, in order.
    pub profiles: Vec<DeviceProfile>,
    /// Accepted extensions for the source recordings, lowercase without dot.
    pub video_extensions: Vec<String>,
    /// Accepted extensions for the soundtrack, lowercase without dot.
    pub audio_extensions: Vec<String>,
    /// JPEG quality 1..=100 for screenshots.
    pub jpeg_quality: u8,
    pub tools: ToolOptions,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            profiles: DeviceProfile::all().to_vec(),
            video_extensions: ["mov", "m4v", "mp4"].iter().map(|x| x.to_string()).collect(),
            audio_extensions: ["mp3", "wav", "aac"].iter().map(|x| x.to_string()).collect(),
            jpeg_quality: 95,
            tools: ToolOptions::default(),
        }
    }
}

impl PreviewOptions {
    /// Defaults overridden by `PREVIEW_PRESET`, `FFMPEG_PATH`, `FFPROBE_PATH`
    /// and `PREVIEW_PROCESS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PreviewError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PreviewError> {
        let mut options = Self::default();

        if let Some(preset) = lookup(PRESET_ENV) {
            options.preset = preset.parse()?;
        }
        if let Some(path) = lookup(FFMPEG_ENV).filter(|p| !p.trim().is_empty()) {
            options.tools.ffmpeg = PathBuf::from(path);
        }
        if let Some(path) = lookup(FFPROBE_ENV).filter(|p| !p.trim().is_empty()) {
            options.tools.ffprobe = PathBuf::from(path);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            options.tools.timeout_secs = secs
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&s| s > 0)
                .ok_or_else(|| {
                    PreviewError::invalid_input(format!(
                        "{TIMEOUT_ENV} must be a positive number of seconds, got `{secs}`"
                    ))
                })?;
        }

        Ok(options)
    }

    #[must_use]
    pub fn target_duration_secs(&self) -> f64 {
        self.preset.target_duration_secs()
    }

    #[must_use]
    pub fn screenshot_count(&self) -> usize {
        self.preset.screenshot_count()
    }
}

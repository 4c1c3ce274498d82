//! # App Store Preview Builder
//!
//! Produces App Store marketing assets for iPhone and iPad from one screen
//! recording per device and a shared soundtrack, using FFmpeg and FFprobe.
//!
//! For every device profile the crate:
//! - loops the recording and the soundtrack so both cover the preset duration,
//! - encodes a fixed-length H.264/AAC preview at the device's preview resolution,
//! - samples evenly spaced frames from the recording and writes them as
//!   high-resolution JPEG screenshots.
//!
//! Output layout:
//!
//! ```text
//! {output}/iphone_preview.mp4
//! {output}/iphone_screenshots/iphone_screenshot_{1..N}.jpg
//! {output}/ipad_preview.mp4
//! {output}/ipad_screenshots/ipad_screenshot_{1..N}.jpg
//! ```
//!
//! ## Requirements
//!
//! - **FFmpeg** and **FFprobe** on the `PATH`, or pointed to by `FFMPEG_PATH`
//!   and `FFPROBE_PATH`.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use appstore_preview_builder::{BatchRequest, PreviewOptions, run_batch};
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let request = BatchRequest {
//!         iphone_video: PathBuf::from("recordings/iphone.mov"),
//!         ipad_video: PathBuf::from("recordings/ipad.mov"),
//!         audio: PathBuf::from("recordings/theme.mp3"),
//!         output_dir: PathBuf::from("output"),
//!     };
//!
//!     let report = run_batch(&request, &PreviewOptions::default()).await?;
//!     for (device, error) in report.failures() {
//!         eprintln!("{device}: {error}");
//!     }
//!     Ok(())
//! }
//! ```

// Helpers for moving and pruning output files.
mod utils;
// Wrappers around the `ffmpeg` command-line tool.
mod ffmpeg;
// Wrappers around the `ffprobe` command-line tool.
pub mod ffprobe;

pub mod assets;
pub mod config;
pub mod error;
pub mod loop_plan;
pub mod profiles;
pub mod video_source;

pub use assets::batch::{BatchReport, BatchRequest, DeviceReport, run_batch, validate_inputs};
pub use assets::screenshots::{SamplingShortfall, ScreenshotSet, sample_frame_indices};
pub use assets::{DeviceAssets, JobSpec, generate_device_assets};
pub use config::{PreviewOptions, ToolOptions};
pub use error::PreviewError;
pub use loop_plan::{LoopPlan, plan_loop_count};
pub use profiles::{Device, DeviceProfile, Preset, Resolution};

use crate::assets::{DeviceAssets, JobSpec, generate_device_assets, screenshots_dir};
use crate::config::PreviewOptions;
use crate::error::PreviewError;
use crate::profiles::Device;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Inputs for one run: one recording per device, a shared soundtrack and the
/// output root.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    pub iphone_video: PathBuf,
    pub ipad_video: PathBuf,
    pub audio: PathBuf,
    pub output_dir: PathBuf,
}

impl BatchRequest {
    #[must_use]
    pub fn video_for(&self, device: Device) -> &Path {
        match device {
            Device::Iphone => &self.iphone_video,
            Device::Ipad => &self.ipad_video,
        }
    }
}

#[derive(Debug)]
pub struct DeviceReport {
    pub device: Device,
    pub outcome: Result<DeviceAssets, PreviewError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub devices: Vec<DeviceReport>,
}

impl BatchReport {
    /// True when every device produced its preview and screenshots. A
    /// screenshot shortfall still counts as success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.devices.iter().all(|d| d.outcome.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Device, &PreviewError)> {
        self.devices
            .iter()
            .filter_map(|d| d.outcome.as_ref().err().map(|e| (d.device, e)))
    }
}

/// Checks every input up front. Nothing is created or spawned when this
/// fails.
pub fn validate_inputs(request: &BatchRequest, options: &PreviewOptions) -> Result<(), PreviewError> {
    for profile in &options.profiles {
        check_input(
            request.video_for(profile.device),
            &options.video_extensions,
            "video",
        )?;
    }
    check_input(&request.audio, &options.audio_extensions, "audio")
}

fn check_input(path: &Path, allowed: &[String], kind: &str) -> Result<(), PreviewError> {
    if !path.is_file() {
        return Err(PreviewError::invalid_input(format!(
            "Input file not found: {}",
            path.display()
        )));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !allowed.contains(&ext) {
        let supported: Vec<String> = allowed.iter().map(|e| format!(".{e}")).collect();
        return Err(PreviewError::invalid_input(format!(
            "Unsupported {kind} file extension `.{ext}` for {}. Supported extensions are: {}",
            path.display(),
            supported.join(", ")
        )));
    }
    Ok(())
}

/// Creates the output root and one screenshot directory per device. Existing
/// directories are left alone.
pub fn prepare_output_dirs(output_dir: &Path, options: &PreviewOptions) -> Result<(), PreviewError> {
    fs::create_dir_all(output_dir)
        .map_err(|e| PreviewError::io(format!("creating {}", output_dir.display()), e))?;
    for profile in &options.profiles {
        let dir = screenshots_dir(output_dir, profile);
        fs::create_dir_all(&dir).map_err(|e| PreviewError::io(format!("creating {}", dir.display()), e))?;
    }
    Ok(())
}

/// Validates inputs, then produces assets for every configured device in
/// order, all sharing the same soundtrack.
///
/// Only validation and directory setup errors abort the run. A device that
/// fails is recorded in the report and the next device is still processed;
/// outputs of earlier devices stay in place.
pub async fn run_batch(request: &BatchRequest, options: &PreviewOptions) -> Result<BatchReport, PreviewError> {
    validate_inputs(request, options)?;
    prepare_output_dirs(&request.output_dir, options)?;

    let mut report = BatchReport::default();
    for profile in &options.profiles {
        let device = profile.device;
        info!("Processing {} video...", device.label());

        let job = JobSpec {
            input_video: request.video_for(device).to_path_buf(),
            audio: request.audio.clone(),
            profile: *profile,
            output_dir: request.output_dir.clone(),
        };
        let outcome = generate_device_assets(&job, options).await;

        match &outcome {
            Ok(assets) => match assets.screenshots.shortfall() {
                Some(s) => warn!(
                    "{} finished with {}/{} screenshots",
                    device.label(),
                    s.captured,
                    s.requested
                ),
                None => info!("{} assets complete", device.label()),
            },
            Err(e) => error!("{} failed: {e}", device.label()),
        }
        report.devices.push(DeviceReport { device, outcome });
    }

    Ok(report)
}

use crate::assets::JobSpec;
use crate::config::PreviewOptions;
use crate::error::PreviewError;
use crate::ffmpeg::run_ffmpeg;
use crate::loop_plan::LoopPlan;
use crate::utils::path_str;
use log::info;
use std::path::PathBuf;

const OUTPUT_FPS: &str = "30";
const MAX_RATE: &str = "220M";
const BUFFER_SIZE: &str = "440M";
const AUDIO_BITRATE: &str = "256k";
const AUDIO_SAMPLE_RATE: &str = "48000";

/// Builds the full ffmpeg argument list for one preview video.
///
/// Both inputs are looped, the video is scaled and padded to the exact
/// profile size, and the output is cut at the preset duration.
#[must_use]
pub fn preview_args(job: &JobSpec, plan: &LoopPlan, options: &PreviewOptions) -> Vec<String> {
    let res = job.profile.preview_resolution;
    let (w, h) = (res.width, res.height);
    let preset = options.preset;

    let mut args: Vec<String> = vec!["-hide_banner".into(), "-nostdin".into(), "-y".into()];

    // 1. inputs
    args.extend([
        "-stream_loop".into(),
        plan.video_loop_count.to_string(),
        "-i".into(),
        path_str(&job.input_video),
        "-stream_loop".into(),
        plan.audio_loop_count.to_string(),
        "-i".into(),
        path_str(&job.audio),
    ]);

    // 2. picture from the recording, sound from the soundtrack only
    args.extend([
        "-map".into(),
        "0:v:0".into(),
        "-map".into(),
        "1:a:0".into(),
        "-vf".into(),
        format!("scale={w}:{h},pad={w}:{h}:0:0"),
        "-t".into(),
        preset.target_duration_secs().to_string(),
    ]);

    // 3. store submission encoding
    args.extend([
        "-r".into(),
        OUTPUT_FPS.into(),
        "-c:v".into(),
        "libx264".into(),
        "-profile:v".into(),
        "high".into(),
        "-level:v".into(),
        "4.0".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-b:v".into(),
        preset.video_bitrate().into(),
        "-maxrate".into(),
        MAX_RATE.into(),
        "-bufsize".into(),
        BUFFER_SIZE.into(),
        "-preset".into(),
        "slow".into(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        AUDIO_BITRATE.into(),
        "-ac".into(),
        "2".into(),
        "-ar".into(),
        AUDIO_SAMPLE_RATE.into(),
        "-movflags".into(),
        "+faststart".into(),
        path_str(&job.preview_path()),
    ]);

    args
}

/// Encodes `{output}/{device}_preview.mp4`, overwriting any earlier file.
pub async fn encode_preview(
    job: &JobSpec,
    plan: &LoopPlan,
    options: &PreviewOptions,
) -> Result<PathBuf, PreviewError> {
    let output = job.preview_path();
    info!(
        "Encoding {} preview at {} ({}s)",
        job.profile.device.label(),
        job.profile.preview_resolution,
        options.target_duration_secs()
    );

    run_ffmpeg(&preview_args(job, plan, options), &options.tools).await?;

    info!("Generated preview video for {}: {}", job.profile.device, output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{Device, DeviceProfile, Preset};
    use std::path::Path;

    fn job(device: Device) -> JobSpec {
        JobSpec {
            input_video: PathBuf::from("/in/demo recording.mov"),
            audio: PathBuf::from("/in/theme.mp3"),
            profile: DeviceProfile::for_device(device),
            output_dir: PathBuf::from("/out"),
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> &'a str {
        let i = args.iter().position(|a| a == flag).unwrap();
        &args[i + 1]
    }

    #[test]
    fn loops_each_input_separately() {
        let plan = LoopPlan {
            video_loop_count: 6,
            audio_loop_count: 10,
        };
        let args = preview_args(&job(Device::Iphone), &plan, &PreviewOptions::default());

        assert_eq!(
            &args[3..11],
            [
                "-stream_loop",
                "6",
                "-i",
                "/in/demo recording.mov",
                "-stream_loop",
                "10",
                "-i",
                "/in/theme.mp3"
            ]
        );
    }

    #[test]
    fn scales_pads_and_cuts() {
        let plan = LoopPlan {
            video_loop_count: 1,
            audio_loop_count: 1,
        };
        let args = preview_args(&job(Device::Ipad), &plan, &PreviewOptions::default());

        assert_eq!(value_after(&args, "-vf"), "scale=1200:1600,pad=1200:1600:0:0");
        assert_eq!(value_after(&args, "-t"), "30");
        assert_eq!(value_after(&args, "-b:v"), "11M");
        assert_eq!(value_after(&args, "-ar"), "48000");
        assert_eq!(args.last().map(String::as_str), Some("/out/ipad_preview.mp4"));
        assert!(args.contains(&"-y".to_string()));
    }

    #[test]
    fn extended_preset_changes_targets() {
        let plan = LoopPlan {
            video_loop_count: 2,
            audio_loop_count: 3,
        };
        let options = PreviewOptions {
            preset: Preset::V2,
            ..PreviewOptions::default()
        };
        let args = preview_args(&job(Device::Iphone), &plan, &options);

        assert_eq!(value_after(&args, "-t"), "60");
        assert_eq!(value_after(&args, "-b:v"), "12M");
        assert_eq!(value_after(&args, "-vf"), "scale=886:1920,pad=886:1920:0:0");
    }

    #[test]
    fn maps_video_from_recording_and_audio_from_track() {
        let plan = LoopPlan {
            video_loop_count: 1,
            audio_loop_count: 1,
        };
        let args = preview_args(&job(Device::Iphone), &plan, &PreviewOptions::default());
        let maps: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-map")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(maps, ["0:v:0", "1:a:0"]);
        assert!(Path::new(args.last().unwrap()).ends_with("iphone_preview.mp4"));
    }
}

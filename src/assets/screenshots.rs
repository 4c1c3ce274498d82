use crate::error::PreviewError;
use crate::profiles::{Device, Resolution};
use crate::utils::{move_dir_contents, remove_matching};
use crate::video_source::FrameSource;
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use temp_dir::TempDir;

/// One written still.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screenshot {
    pub frame_index: u64,
    pub path: PathBuf,
}

/// A sampled frame that could not be turned into a screenshot.
#[derive(Clone, Debug)]
pub struct SkippedFrame {
    pub frame_index: u64,
    pub reason: String,
}

/// Fewer stills than requested were written. Reported, never fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingShortfall {
    pub requested: usize,
    pub captured: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ScreenshotSet {
    pub requested: usize,
    pub captured: Vec<Screenshot>,
    pub skipped: Vec<SkippedFrame>,
}

impl ScreenshotSet {
    #[must_use]
    pub fn shortfall(&self) -> Option<SamplingShortfall> {
        (self.captured.len() < self.requested).then_some(SamplingShortfall {
            requested: self.requested,
            captured: self.captured.len(),
        })
    }
}

/// `count` frame indices spread evenly over `0..=total_frames - 1`, first and
/// last frame included. Fractional positions are truncated.
#[must_use]
pub fn sample_frame_indices(total_frames: u64, count: usize) -> Vec<u64> {
    if total_frames == 0 || count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![0];
    }

    let last = total_frames - 1;
    let steps = (count - 1) as u64;
    (0..count as u64).map(|i| i * last / steps).collect()
}

#[must_use]
pub fn screenshot_name(device: Device, number: usize) -> String {
    format!("{}_screenshot_{number}.jpg", device.id())
}

/// Samples `count` frames from `source` and writes them as JPEG stills of
/// exactly `resolution` into `output_dir`.
///
/// Stills are rendered into a staging directory first; once sampling is
/// done, screenshots left in `output_dir` by earlier runs are removed and the
/// new set is moved in. A frame that fails to decode is skipped.
pub async fn capture_screenshots<S: FrameSource>(
    source: &S,
    device: Device,
    count: usize,
    resolution: Resolution,
    output_dir: &Path,
    jpeg_quality: u8,
) -> Result<ScreenshotSet, PreviewError> {
    let staging = TempDir::new().map_err(|e| PreviewError::io("creating staging directory", e))?;
    let indices = sample_frame_indices(source.frame_count(), count);
    let mut resizer = Resizer::new();
    let mut set = ScreenshotSet {
        requested: count,
        ..ScreenshotSet::default()
    };

    for frame_index in indices {
        let number = set.captured.len() + 1;
        let name = screenshot_name(device, number);

        let written = match source.decode_frame(frame_index).await {
            Ok(frame) => write_still(&mut resizer, &frame, resolution, &staging.child(&name), jpeg_quality),
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => {
                info!("Captured screenshot {number}/{count}: frame {frame_index}");
                set.captured.push(Screenshot {
                    frame_index,
                    path: output_dir.join(&name),
                });
            }
            Err(e) => {
                warn!("Skipping frame {frame_index} for {device}: {e}");
                set.skipped.push(SkippedFrame {
                    frame_index,
                    reason: e.to_string(),
                });
            }
        }
    }

    let prefix = format!("{}_screenshot_", device.id());
    let stale = remove_matching(output_dir, &prefix, "jpg").await?;
    if !stale.is_empty() {
        info!("Removed {} screenshot(s) from a previous run", stale.len());
    }
    move_dir_contents(staging.path(), output_dir).await?;
    staging
        .cleanup()
        .map_err(|e| PreviewError::io("removing staging directory", e))?;

    if let Some(shortfall) = set.shortfall() {
        warn!(
            "Only captured {} screenshots instead of {} for {device}",
            shortfall.captured, shortfall.requested
        );
    }

    Ok(set)
}

/// Lanczos3 resize to the exact target size, then JPEG encode.
fn write_still(
    resizer: &mut Resizer,
    frame: &DynamicImage,
    resolution: Resolution,
    path: &Path,
    quality: u8,
) -> Result<(), PreviewError> {
    let resized = resize_frame(resizer, frame, resolution)?;

    let file = File::create(path).map_err(|e| PreviewError::io(format!("creating {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality).encode_image(&resized)?;
    writer
        .flush()
        .map_err(|e| PreviewError::io(format!("writing {}", path.display()), e))
}

pub(crate) fn resize_frame(
    resizer: &mut Resizer,
    frame: &DynamicImage,
    resolution: Resolution,
) -> Result<RgbImage, PreviewError> {
    let rgb = frame.to_rgb8();
    let (src_w, src_h) = rgb.dimensions();
    if src_w == 0 || src_h == 0 || resolution.width == 0 || resolution.height == 0 {
        return Err(PreviewError::Resize(format!(
            "cannot resize {src_w}x{src_h} to {resolution}"
        )));
    }

    let src = Image::from_vec_u8(src_w, src_h, rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| PreviewError::Resize(e.to_string()))?;
    let mut dst = Image::new(resolution.width, resolution.height, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src, &mut dst, &options)
        .map_err(|e| PreviewError::Resize(e.to_string()))?;

    RgbImage::from_raw(resolution.width, resolution.height, dst.into_vec())
        .ok_or_else(|| PreviewError::Resize("resized buffer has the wrong length".into()))
}

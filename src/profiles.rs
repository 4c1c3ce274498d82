use crate::error::PreviewError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target device class for a set of store assets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Iphone,
    Ipad,
}

impl Device {
    pub const ALL: [Device; 2] = [Device::Iphone, Device::Ipad];

    /// Identifier used in every output file name.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Device::Iphone => "iphone",
            Device::Ipad => "ipad",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Device::Iphone => "iPhone",
            Device::Ipad => "iPad",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Output resolutions for one device class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub device: Device,
    /// Resolution of the encoded preview video.
    pub preview_resolution: Resolution,
    /// Resolution of the exported still images.
    pub screenshot_resolution: Resolution,
}

const IPHONE: DeviceProfile = DeviceProfile {
    device: Device::Iphone,
    preview_resolution: Resolution::new(886, 1920),
    screenshot_resolution: Resolution::new(1320, 2868),
};

const IPAD: DeviceProfile = DeviceProfile {
    device: Device::Ipad,
    preview_resolution: Resolution::new(1200, 1600),
    screenshot_resolution: Resolution::new(2064, 2752),
};

impl DeviceProfile {
    #[must_use]
    pub const fn for_device(device: Device) -> Self {
        match device {
            Device::Iphone => IPHONE,
            Device::Ipad => IPAD,
        }
    }

    /// Profiles in processing order.
    #[must_use]
    pub fn all() -> [DeviceProfile; 2] {
        Device::ALL.map(Self::for_device)
    }
}

/// Versioned duration / screenshot count / bitrate targets.
///
/// `V1` is the 30 second revision and the default; `V2` is the 60 second
/// revision with ten screenshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    #[default]
    V1,
    V2,
}

impl Preset {
    #[must_use]
    pub const fn target_duration_secs(self) -> f64 {
        match self {
            Preset::V1 => 30.0,
            Preset::V2 => 60.0,
        }
    }

    #[must_use]
    pub const fn screenshot_count(self) -> usize {
        match self {
            Preset::V1 => 6,
            Preset::V2 => 10,
        }
    }

    /// Target video bitrate in ffmpeg notation.
    #[must_use]
    pub const fn video_bitrate(self) -> &'static str {
        match self {
            Preset::V1 => "11M",
            Preset::V2 => "12M",
        }
    }
}

impl FromStr for Preset {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "standard" | "30" => Ok(Preset::V1),
            "v2" | "extended" | "60" => Ok(Preset::V2),
            other => Err(PreviewError::invalid_input(format!(
                "unknown preset `{other}` (expected v1/standard or v2/extended)"
            ))),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::V1 => f.write_str("v1"),
            Preset::V2 => f.write_str("v2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolutions_are_positive_and_even() {
        for profile in DeviceProfile::all() {
            for res in [profile.preview_resolution, profile.screenshot_resolution] {
                assert!(res.width > 0 && res.height > 0, "{res} for {}", profile.device);
                assert_eq!(res.width % 2, 0, "{res} for {}", profile.device);
                assert_eq!(res.height % 2, 0, "{res} for {}", profile.device);
            }
        }
    }

    #[test]
    fn profiles_keep_processing_order() {
        let ids: Vec<&str> = DeviceProfile::all().iter().map(|p| p.device.id()).collect();
        assert_eq!(ids, ["iphone", "ipad"]);
    }

    #[test]
    fn iphone_profile_matches_store_sizes() {
        let p = DeviceProfile::for_device(Device::Iphone);
        assert_eq!(p.preview_resolution, Resolution::new(886, 1920));
        assert_eq!(p.screenshot_resolution, Resolution::new(1320, 2868));
    }

    #[test]
    fn preset_parsing() {
        assert_eq!("standard".parse::<Preset>().unwrap(), Preset::V1);
        assert_eq!(" V2 ".parse::<Preset>().unwrap(), Preset::V2);
        assert!("v3".parse::<Preset>().is_err());
    }

    #[test]
    fn preset_targets() {
        assert_eq!(Preset::default(), Preset::V1);
        assert_eq!(Preset::V1.target_duration_secs(), 30.0);
        assert_eq!(Preset::V1.screenshot_count(), 6);
        assert_eq!(Preset::V2.target_duration_secs(), 60.0);
        assert_eq!(Preset::V2.screenshot_count(), 10);
    }
}

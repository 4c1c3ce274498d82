//! Error type shared by every stage of the asset pipeline.

use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Rejected before any external process is spawned.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to probe {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("ffmpeg exited with {status} while running `{command}`: {stderr}")]
    Encode {
        command: String,
        status: ExitStatus,
        stderr: String,
        stdout: String,
    },

    #[error("failed to decode frame {frame}: {reason}")]
    Decode { frame: u64, reason: String },

    #[error("{program} did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("resize failed: {0}")]
    Resize(String),
}

impl PreviewError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

pub type Result<T, E = PreviewError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_error_names_path() {
        let e = PreviewError::probe("/media/song.mp3", "ffprobe exited with 1");
        assert_eq!(
            e.to_string(),
            "failed to probe /media/song.mp3: ffprobe exited with 1"
        );
    }

    #[test]
    fn io_error_keeps_context() {
        let e = PreviewError::io(
            "creating output",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.to_string(), "creating output: denied");
        assert!(!e.is_invalid_input());
    }

    #[test]
    fn invalid_input_is_flagged() {
        assert!(PreviewError::invalid_input("missing file").is_invalid_input());
    }
}

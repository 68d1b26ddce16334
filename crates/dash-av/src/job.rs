//! Declarative DASH job description.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::preset::Rendition;
use crate::{Error, Result};

/// Live capture backend understood by ffmpeg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// macOS AVFoundation
    #[default]
    Avfoundation,
    /// Linux Video4Linux2
    V4l2,
}

impl CaptureFormat {
    /// Value passed to ffmpeg's `-f`.
    pub fn ffmpeg_format(&self) -> &'static str {
        match self {
            CaptureFormat::Avfoundation => "avfoundation",
            CaptureFormat::V4l2 => "v4l2",
        }
    }

    /// ffmpeg `-i` address of the first capture device for this backend.
    ///
    /// AVFoundation takes `<video index>:<audio index>`; v4l2 takes a device
    /// node and has no audio.
    pub const fn default_device(&self) -> &'static str {
        match self {
            CaptureFormat::Avfoundation => "0:0",
            CaptureFormat::V4l2 => "/dev/video0",
        }
    }
}

impl std::str::FromStr for CaptureFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "avfoundation" => Ok(CaptureFormat::Avfoundation),
            "v4l2" | "video4linux2" => Ok(CaptureFormat::V4l2),
            _ => Err(format!("Unknown capture format: {}", s)),
        }
    }
}

/// Where the engine reads media from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputSource {
    /// A media file on disk.
    File { path: PathBuf },
    /// A live capture device.
    Capture {
        /// ffmpeg input address, e.g. `0:0`.
        device: String,
        format: CaptureFormat,
        framerate: Option<u32>,
        /// Token reported by device discovery.
        device_name: String,
    },
}

impl InputSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        InputSource::File { path: path.into() }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, InputSource::Capture { .. })
    }
}

/// Codec profile of the packaged video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProfile {
    #[default]
    H264,
}

/// How the engine places its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write into a staging directory and move into place on success.
    /// Partial output is removed on failure.
    Staged,
    /// Write in place. Required when the manifest must be readable while the
    /// job is still running.
    Direct,
}

/// Everything the engine needs to produce one DASH package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashJob {
    pub source: InputSource,
    pub profile: VideoProfile,
    pub renditions: Vec<Rendition>,
    /// Manifest path; segments are written next to it.
    pub output: PathBuf,
    pub mode: OutputMode,
}

impl DashJob {
    /// Build a job, rejecting empty or non-positive renditions.
    pub fn new(
        source: InputSource,
        renditions: Vec<Rendition>,
        output: impl Into<PathBuf>,
        mode: OutputMode,
    ) -> Result<Self> {
        if renditions.is_empty() {
            return Err(Error::InvalidInput(
                "a DASH job needs at least one rendition".to_string(),
            ));
        }
        if let Some(bad) = renditions.iter().find(|r| !r.is_valid()) {
            return Err(Error::InvalidInput(format!(
                "rendition dimensions and bitrates must be positive: {:?}",
                bad
            )));
        }

        let output = output.into();
        if output.file_name().is_none() {
            return Err(Error::InvalidInput(format!(
                "output path has no file name: {}",
                output.display()
            )));
        }

        Ok(Self {
            source,
            profile: VideoProfile::default(),
            renditions,
            output,
            mode,
        })
    }

    /// Directory that receives the manifest and segments.
    pub fn output_dir(&self) -> &Path {
        match self.output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

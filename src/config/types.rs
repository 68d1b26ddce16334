use dash_av::{CaptureFormat, EncodeSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub encode: EncodeConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Config {
    /// Encoder settings handed to the engine.
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            video_codec: self.encode.video_codec.clone(),
            audio_codec: self.encode.audio_codec.clone(),
            segment_duration: self.encode.segment_duration,
            keyint_min: self.encode.keyint_min,
            gop_size: self.encode.gop_size,
        }
    }

    /// Engine timeout; `None` when `timeout_secs` is 0.
    pub fn engine_timeout(&self) -> Option<Duration> {
        match self.engine.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Configured capture backend, avfoundation if unset.
    pub fn capture_format(&self) -> CaptureFormat {
        self.capture.format.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodeConfig {
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Target segment length in seconds
    #[serde(default = "default_segment_duration")]
    pub segment_duration: u32,

    #[serde(default = "default_keyint_min")]
    pub keyint_min: u32,

    #[serde(default = "default_gop_size")]
    pub gop_size: u32,
}

fn default_video_codec() -> String {
    "libx264".to_string()
}
fn default_audio_codec() -> String {
    "aac".to_string()
}
fn default_segment_duration() -> u32 {
    10
}
fn default_keyint_min() -> u32 {
    25
}
fn default_gop_size() -> u32 {
    250
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            segment_duration: default_segment_duration(),
            keyint_min: default_keyint_min(),
            gop_size: default_gop_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Kill ffmpeg after this many seconds (0 = never)
    #[serde(default)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Capture backend (avfoundation, v4l2); avfoundation if unset
    #[serde(default)]
    pub format: Option<CaptureFormat>,

    #[serde(default)]
    pub framerate: Option<u32>,

    #[serde(default = "default_listing_timeout")]
    pub listing_timeout_secs: u64,
}

fn default_listing_timeout() -> u64 {
    10
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            format: None,
            framerate: None,
            listing_timeout_secs: default_listing_timeout(),
        }
    }
}

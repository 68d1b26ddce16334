mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./mp4dash.toml", "~/.config/mp4dash/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.encode.segment_duration == 0 {
        anyhow::bail!("encode.segment_duration must be greater than 0");
    }

    if config.encode.gop_size == 0 {
        anyhow::bail!("encode.gop_size must be greater than 0");
    }

    if config.encode.video_codec.trim().is_empty() || config.encode.audio_codec.trim().is_empty()
    {
        anyhow::bail!("encode.video_codec and encode.audio_codec cannot be empty");
    }

    if config.capture.framerate == Some(0) {
        anyhow::bail!("capture.framerate must be greater than 0");
    }

    if config.capture.listing_timeout_secs == 0 {
        anyhow::bail!("capture.listing_timeout_secs must be greater than 0");
    }

    if let Some(ref path) = config.tools.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    Ok(())
}

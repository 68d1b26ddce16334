//! Capture device discovery.
//!
//! The listing tool's combined output is reduced to a single token: the
//! first line, cut at the first `/`.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::command::ToolCommand;
use crate::job::CaptureFormat;
use crate::{Error, Result};

/// Produces the raw text of a device listing.
#[async_trait]
pub trait DeviceLister: Send + Sync {
    async fn list(&self) -> Result<String>;
}

/// [`DeviceLister`] that runs a platform listing command.
#[derive(Debug, Clone)]
pub struct CommandLister {
    command: ToolCommand,
}

impl CommandLister {
    /// Lister for the given capture backend.
    ///
    /// `ffmpeg` is used for avfoundation; v4l2 devices are listed with
    /// `v4l2-ctl`.
    pub fn for_format(format: CaptureFormat, ffmpeg: PathBuf, timeout: Duration) -> Self {
        let mut command = match format {
            CaptureFormat::Avfoundation => {
                let mut cmd = ToolCommand::new(ffmpeg);
                cmd.args(["-y", "-hide_banner", "-f", "avfoundation"]);
                cmd.args(["-list_devices", "true", "-i", ""]);
                cmd
            }
            CaptureFormat::V4l2 => {
                let mut cmd = ToolCommand::new(PathBuf::from("v4l2-ctl"));
                cmd.arg("--list-devices");
                cmd
            }
        };
        command.timeout(timeout);
        Self { command }
    }

    /// Lister around an arbitrary command.
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl DeviceLister for CommandLister {
    async fn list(&self) -> Result<String> {
        // ffmpeg's -list_devices always exits non-zero because the empty
        // input cannot be opened, so only the output matters here.
        let output = self
            .command
            .output()
            .await
            .map_err(|e| Error::device_discovery(e.to_string()))?;

        if !output.status.success() {
            tracing::debug!("Device listing exited with {}", output.status);
        }

        Ok(output.combined())
    }
}

/// Extract the device token from listing output.
///
/// # Errors
///
/// Returns [`Error::DeviceDiscovery`] when the listing has no first line or
/// the token is blank.
pub fn parse_device_token(listing: &str) -> Result<String> {
    let first = listing
        .lines()
        .next()
        .ok_or_else(|| Error::device_discovery("device listing produced no output"))?;

    let token = first.split('/').next().unwrap_or(first);
    if token.trim().is_empty() {
        return Err(Error::device_discovery(format!(
            "no device name in listing line {:?}",
            first
        )));
    }

    Ok(token.to_string())
}

/// Run `lister` and parse its output into a device token.
pub async fn discover_device(lister: &dyn DeviceLister) -> Result<String> {
    let listing = lister.list().await?;
    let token = parse_device_token(&listing)?;
    tracing::info!("Discovered capture device: {}", token);
    Ok(token)
}

//! Live capture conversion: camera in, single-rendition DASH out.
//!
//! Device address and output path are fixed per capture backend; only the
//! discovered device name varies between runs.

use dash_av::{
    device, preset, CaptureFormat, DashJob, DeviceLister, Engine, InputSource, OutputMode,
};

use super::{submit, Outcome};
use crate::error::CommandError;

/// ffmpeg input address of the capture device under the default backend.
pub const CAPTURE_DEVICE: &str = CaptureFormat::Avfoundation.default_device();

/// Manifest written by the capture command.
pub const CAPTURE_OUTPUT: &str = "./dash.mpd";

/// What to do when device discovery fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryPolicy {
    /// Abort before submitting anything.
    #[default]
    FailFast,
    /// Log a warning and continue with the error text as the device name.
    BestEffort,
}

#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    pub policy: DiscoveryPolicy,
    pub format: Option<CaptureFormat>,
    pub framerate: Option<u32>,
    pub dry_run: bool,
}

/// Discover the device name, applying `policy` on failure.
pub async fn resolve_device(
    lister: &dyn DeviceLister,
    policy: DiscoveryPolicy,
) -> Result<String, CommandError> {
    match (device::discover_device(lister).await, policy) {
        (Ok(name), _) => Ok(name),
        (Err(e), DiscoveryPolicy::FailFast) => Err(CommandError::DeviceDiscovery(e)),
        (Err(e), DiscoveryPolicy::BestEffort) => {
            let placeholder = e.to_string();
            tracing::warn!(
                "Device discovery failed, continuing with placeholder: {}",
                placeholder
            );
            Ok(placeholder)
        }
    }
}

/// Job description for the fixed capture device of `format`.
pub fn build_job(
    device_name: String,
    format: CaptureFormat,
    framerate: Option<u32>,
) -> Result<DashJob, CommandError> {
    let job = DashJob::new(
        InputSource::Capture {
            device: format.default_device().to_string(),
            format,
            framerate,
            device_name,
        },
        vec![preset::CAPTURE_RENDITION],
        CAPTURE_OUTPUT,
        OutputMode::Direct,
    )?;
    Ok(job)
}

/// Run the capture conversion command.
pub async fn run(
    lister: &dyn DeviceLister,
    options: &CaptureOptions,
    engine: &dyn Engine,
) -> Result<Outcome, CommandError> {
    let device_name = resolve_device(lister, options.policy).await?;

    let format = options.format.unwrap_or_default();
    let job = build_job(device_name, format, options.framerate)?;
    tracing::info!(
        "Capturing {} via {} -> {}",
        format.default_device(),
        format.ffmpeg_format(),
        CAPTURE_OUTPUT
    );

    submit(job, engine, options.dry_run).await
}

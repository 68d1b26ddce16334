//! # dash-av
//!
//! MPEG-DASH packaging on top of the ffmpeg CLI.
//!
//! This crate provides:
//!
//! - **Presets** ([`preset`]) -- the fixed rendition ladders.
//! - **Job description** ([`DashJob`]) -- input source, renditions and
//!   output manifest for one package.
//! - **Engine** ([`Engine`], [`FfmpegEngine`]) -- submits a job and blocks
//!   until the package is written.
//! - **Staging** ([`Workspace`]) -- hidden output directory that is moved into
//!   place on success and removed on failure.
//! - **Device discovery** ([`device`]) -- capture device lookup through a
//!   platform listing command.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//!
//! ## Example
//!
//! ```no_run
//! use dash_av::{preset, DashJob, EncodeSettings, Engine, FfmpegEngine, InputSource, OutputMode};
//!
//! # async fn example() -> dash_av::Result<()> {
//! let job = DashJob::new(
//!     InputSource::file("movie.mp4"),
//!     preset::STANDARD_LADDER.to_vec(),
//!     "out/movie.mpd",
//!     OutputMode::Staged,
//! )?;
//! let engine = FfmpegEngine::new(dash_av::require_tool("ffmpeg")?, EncodeSettings::default());
//! engine.submit(&job).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod device;
pub mod engine;
mod error;
pub mod job;
pub mod preset;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use device::{discover_device, parse_device_token, CommandLister, DeviceLister};
pub use engine::{EncodeSettings, Engine, FfmpegEngine};
pub use error::{Error, Result};
pub use job::{CaptureFormat, DashJob, InputSource, OutputMode, VideoProfile};
pub use preset::Rendition;
pub use tools::{get_tool_path, require_tool};
pub use workspace::Workspace;

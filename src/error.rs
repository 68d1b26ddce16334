//! Command-level errors and their process exit codes.

use std::fmt;
use std::path::PathBuf;

/// Why an output path cannot receive a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The path is an existing directory.
    Directory,
    /// The path resolves to the input file.
    Input,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Directory => write!(f, "is an existing directory"),
            Conflict::Input => write!(f, "is the input file"),
        }
    }
}

/// Why a command stopped before producing a package.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Wrong number of positional arguments.
    #[error(
        "Usage: mp4-to-dash <input mp4 path> <output mpd path> (expected 2 arguments, received {count})"
    )]
    Usage { count: usize },

    /// The output path cannot be written without destroying something.
    #[error("output path {conflict}: {}", path.display())]
    DestinationConflict { path: PathBuf, conflict: Conflict },

    /// The input media file does not exist.
    #[error("input file does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// No usable capture device was found.
    #[error("{0}")]
    DeviceDiscovery(#[source] dash_av::Error),

    /// The transcoding engine failed or could not be started.
    #[error("transcoding failed: {0}")]
    Engine(#[source] dash_av::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0:#}")]
    Config(#[source] anyhow::Error),

    /// The run was cancelled with Ctrl-C.
    #[error("interrupted")]
    Interrupted,
}

impl CommandError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Usage { .. } => 2,
            CommandError::DestinationConflict { .. } => 3,
            CommandError::InputNotFound { .. } => 4,
            CommandError::DeviceDiscovery(_) => 5,
            CommandError::Engine(_) | CommandError::Config(_) => 1,
            CommandError::Interrupted => 130,
        }
    }
}

impl From<dash_av::Error> for CommandError {
    fn from(err: dash_av::Error) -> Self {
        match err {
            dash_av::Error::FileNotFound { path } => CommandError::InputNotFound { path },
            dash_av::Error::DeviceDiscovery(_) => CommandError::DeviceDiscovery(err),
            other => CommandError::Engine(other),
        }
    }
}

//! File conversion: one MP4 in, a six-rendition DASH package out.

use std::path::{Path, PathBuf};

use dash_av::engine::same_file;
use dash_av::{preset, DashJob, Engine, InputSource, OutputMode};

use super::{submit, Outcome};
use crate::error::{CommandError, Conflict};

/// Result of checking the positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileArgs {
    Valid { input: PathBuf, output: PathBuf },
    /// Argument count was not 2.
    Usage { count: usize },
    /// The output path is an existing directory or the input itself.
    Conflict { output: PathBuf, conflict: Conflict },
}

/// Options that do not change the positional-argument rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions {
    /// Append the 1440p and 2160p renditions.
    pub include_uhd: bool,
    pub dry_run: bool,
}

/// Check the positional arguments.
pub fn validate_args(paths: &[PathBuf]) -> FileArgs {
    match paths {
        [_, output] if output.is_dir() => FileArgs::Conflict {
            output: output.clone(),
            conflict: Conflict::Directory,
        },
        [input, output] if same_file(input, output) => FileArgs::Conflict {
            output: output.clone(),
            conflict: Conflict::Input,
        },
        [input, output] => FileArgs::Valid {
            input: input.clone(),
            output: output.clone(),
        },
        _ => FileArgs::Usage { count: paths.len() },
    }
}

/// Job description for converting `input` into a manifest at `output`.
pub fn build_job(input: &Path, output: &Path, include_uhd: bool) -> Result<DashJob, CommandError> {
    let job = DashJob::new(
        InputSource::file(input),
        preset::file_ladder(include_uhd),
        output,
        OutputMode::Staged,
    )?;
    Ok(job)
}

/// Validate the arguments and build the job, without touching the engine.
pub fn prepare(paths: &[PathBuf], options: &FileOptions) -> Result<DashJob, CommandError> {
    let (input, output) = match validate_args(paths) {
        FileArgs::Valid { input, output } => (input, output),
        FileArgs::Usage { count } => return Err(CommandError::Usage { count }),
        FileArgs::Conflict { output, conflict } => {
            return Err(CommandError::DestinationConflict {
                path: output,
                conflict,
            })
        }
    };

    if !input.exists() {
        return Err(CommandError::InputNotFound { path: input });
    }

    let job = build_job(&input, &output, options.include_uhd)?;
    tracing::info!(
        "Converting {:?} -> {:?} ({} renditions)",
        input,
        output,
        job.renditions.len()
    );
    Ok(job)
}

/// Run the file conversion command.
pub async fn run(
    paths: &[PathBuf],
    options: &FileOptions,
    engine: &dyn Engine,
) -> Result<Outcome, CommandError> {
    let job = prepare(paths, options)?;
    submit(job, engine, options.dry_run).await
}

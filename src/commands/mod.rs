//! The two conversion commands.
//!
//! Each command runs `START -> VALIDATE_ARGS -> (ABORT | BUILD_JOB) ->
//! SUBMIT -> (SUCCESS | FAILURE)` once per invocation. Aborts and failures
//! are [`CommandError`]s; the successful end states are [`Outcome`]s.

pub mod capture;
pub mod file;

use dash_av::{DashJob, Engine};

use crate::error::CommandError;

/// How a command finished when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The job was submitted and the engine completed it.
    Submitted(DashJob),
    /// `--dry-run`: the job was built but not submitted.
    DryRun(DashJob),
}

impl Outcome {
    pub fn job(&self) -> &DashJob {
        match self {
            Outcome::Submitted(job) | Outcome::DryRun(job) => job,
        }
    }
}

/// Submit `job` to `engine`, or hand it back untouched on a dry run.
pub async fn submit(
    job: DashJob,
    engine: &dyn Engine,
    dry_run: bool,
) -> Result<Outcome, CommandError> {
    if dry_run {
        tracing::info!("Dry run: not submitting job for {:?}", job.output);
        return Ok(Outcome::DryRun(job));
    }

    engine.submit(&job).await?;
    Ok(Outcome::Submitted(job))
}

//! Glue between the parsed command line and the commands.

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use dash_av::{CommandLister, FfmpegEngine};

use crate::cli::{CaptureCli, CommonArgs, FileCli};
use crate::commands::capture::{CaptureOptions, DiscoveryPolicy};
use crate::commands::file::FileOptions;
use crate::commands::{self, Outcome};
use crate::config::{self, Config};
use crate::error::CommandError;

/// Drive `fut` to completion on a fresh runtime and turn the result into an
/// exit code.
pub fn execute<F>(fut: F) -> ExitCode
where
    F: Future<Output = Result<(), CommandError>>,
{
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(fut) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                CommandError::Usage { .. } => eprintln!("{e}"),
                _ => eprintln!("Error: {e}"),
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Entry point of `mp4-to-dash`.
pub async fn run_file(cli: FileCli) -> Result<(), CommandError> {
    let options = FileOptions {
        include_uhd: cli.uhd,
        dry_run: cli.common.dry_run,
    };
    let config = load_config(&cli.common)?;
    let engine = build_engine(&config);

    let outcome = until_interrupted(commands::file::run(&cli.paths, &options, &engine)).await?;
    report(&outcome, &engine, cli.common.json)
}

/// Entry point of `mp4-to-dash-cam`.
pub async fn run_capture(cli: CaptureCli) -> Result<(), CommandError> {
    let config = load_config(&cli.common)?;
    let engine = build_engine(&config);

    let format = config.capture_format();
    let lister = CommandLister::for_format(
        format,
        engine.ffmpeg_path().to_path_buf(),
        Duration::from_secs(config.capture.listing_timeout_secs),
    );
    let options = CaptureOptions {
        policy: if cli.best_effort_discovery {
            DiscoveryPolicy::BestEffort
        } else {
            DiscoveryPolicy::FailFast
        },
        format: Some(format),
        framerate: config.capture.framerate,
        dry_run: cli.common.dry_run,
    };

    let outcome = until_interrupted(commands::capture::run(&lister, &options, &engine)).await?;
    report(&outcome, &engine, cli.common.json)
}

fn load_config(common: &CommonArgs) -> Result<Config, CommandError> {
    config::load_config_or_default(common.config.as_deref()).map_err(CommandError::Config)
}

/// ffmpeg engine from config.
///
/// A missing ffmpeg is not an error here: argument checks and dry runs do
/// not need it, and a real submission fails with `ToolNotFound` at spawn.
pub fn build_engine(config: &Config) -> FfmpegEngine {
    let ffmpeg = dash_av::get_tool_path("ffmpeg", config.tools.ffmpeg_path.as_deref())
        .unwrap_or_else(|e| {
            tracing::debug!("{}; using bare `ffmpeg`", e);
            PathBuf::from("ffmpeg")
        });

    FfmpegEngine::new(ffmpeg, config.encode_settings()).with_timeout(config.engine_timeout())
}

/// Race `fut` against Ctrl-C. Dropping `fut` kills any running ffmpeg and
/// discards staged output.
async fn until_interrupted<F>(fut: F) -> Result<Outcome, CommandError>
where
    F: Future<Output = Result<Outcome, CommandError>>,
{
    tokio::select! {
        result = fut => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping ffmpeg");
            Err(CommandError::Interrupted)
        }
    }
}

fn report(outcome: &Outcome, engine: &FfmpegEngine, json: bool) -> Result<(), CommandError> {
    match outcome {
        Outcome::Submitted(job) => {
            tracing::info!("Done: {}", job.output.display());
        }
        Outcome::DryRun(job) if json => {
            let rendered = serde_json::to_string_pretty(job)
                .map_err(|e| CommandError::Engine(e.into()))?;
            println!("{}", rendered);
        }
        Outcome::DryRun(job) => {
            println!("{}", engine.command(job, &job.output).display_line());
        }
    }
    Ok(())
}

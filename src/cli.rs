use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by both commands.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Build the job and print it instead of running ffmpeg
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the job description as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(name = "mp4-to-dash")]
#[command(author, version, about = "Convert an MP4 file into an MPEG-DASH package")]
pub struct FileCli {
    /// Input MP4 path followed by output MPD path
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Also produce 1440p and 2160p renditions
    #[arg(long)]
    pub uhd: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "mp4-to-dash-cam")]
#[command(
    author,
    version,
    about = "Package the default capture device as live MPEG-DASH into ./dash.mpd"
)]
pub struct CaptureCli {
    /// Continue with a placeholder device name if discovery fails
    #[arg(long)]
    pub best_effort_discovery: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions() {
        FileCli::command().debug_assert();
        CaptureCli::command().debug_assert();
    }

    #[test]
    fn test_file_cli_collects_any_count() {
        let cli = FileCli::try_parse_from(["mp4-to-dash", "a", "b", "c"]).unwrap();
        assert_eq!(cli.paths.len(), 3);

        let cli = FileCli::try_parse_from(["mp4-to-dash"]).unwrap();
        assert!(cli.paths.is_empty());
    }

    #[test]
    fn test_options_do_not_count_as_paths() {
        let cli = FileCli::try_parse_from([
            "mp4-to-dash",
            "--dry-run",
            "--json",
            "-c",
            "cfg.toml",
            "in.mp4",
            "out.mpd",
        ])
        .unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from("in.mp4"), PathBuf::from("out.mpd")]);
        assert!(cli.common.dry_run && cli.common.json);
        assert_eq!(cli.common.config, Some(PathBuf::from("cfg.toml")));
    }

    #[test]
    fn test_json_requires_dry_run() {
        assert!(FileCli::try_parse_from(["mp4-to-dash", "--json", "a", "b"]).is_err());
    }

    #[test]
    fn test_capture_cli_takes_no_paths() {
        assert!(CaptureCli::try_parse_from(["mp4-to-dash-cam", "extra"]).is_err());
        let cli = CaptureCli::try_parse_from(["mp4-to-dash-cam", "--best-effort-discovery"]).unwrap();
        assert!(cli.best_effort_discovery);
    }
}

use clap::Parser;
use mp4dash::cli::CaptureCli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = CaptureCli::parse();
    mp4dash::logging::init(cli.common.verbose);
    mp4dash::app::execute(mp4dash::app::run_capture(cli))
}

use clap::Parser;
use mp4dash::cli::FileCli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = FileCli::parse();
    mp4dash::logging::init(cli.common.verbose);
    mp4dash::app::execute(mp4dash::app::run_file(cli))
}

use clap::Parser;
use crossbench::cli::{init_logging, run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("crossbench: failed to install logger: {e}");
        return ExitCode::FAILURE;
    }
    run(cli)
}

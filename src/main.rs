mod cli;
mod config;
mod error;
mod execution;
mod extractor;
mod output;
mod status;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use log::debug;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    debug!("Starting execlens");

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", output::error_line(format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

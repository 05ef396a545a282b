//! Binary entry point: set up logging, parse arguments, and hand off to the
//! command runner. Fatal errors print their innermost cause and exit non-zero.
use std::process::ExitCode;

use clap::Parser;
use school_records::cli::{run, surface_error, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", surface_error(&err));
            ExitCode::FAILURE
        }
    }
}

//! ## arbor-cli
//! **Command-line front end**
//!
//! Parses, checks and benchmarks JSON documents with the settings loaded by
//! `arbor-config`, overridable per invocation.

use std::process::ExitCode;

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

//! # checkout
//!
//! Command-line entry point. The work happens in `checkout_cli::run` so it
//! can be tested as a library.

use std::process::ExitCode;

fn main() -> ExitCode {
    match checkout_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if err.is_usage_error() {
                eprintln!("Run `checkout --help` for usage.");
            }
            ExitCode::FAILURE
        }
    }
}

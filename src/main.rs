//! Binary entry point for the calidad CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    calidad::cli::run()
}

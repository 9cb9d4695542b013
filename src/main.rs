//! The elastix-cli command-line executable.

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    elastix_cli::run()
}

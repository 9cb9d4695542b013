//! `elastix-cli` is a Slicer-style command-line module for elastix.
//!
//! The module's parameters are declared in an execution-model XML schema.
//! The wrapper parses its own command line against that schema, turns every
//! set parameter into a `-name value` token and runs the elastix executable
//! with those tokens. The child's exit status becomes the wrapper's.
//!
//! # Example
//!
//! ```rust
//! use std::str::FromStr;
//!
//! use elastix_cli::cli::parse_from;
//! use elastix_cli::schema::ModuleSchema;
//! use elastix_cli::translate::to_flag_tokens;
//!
//! # fn demo() -> anyhow::Result<()> {
//! let schema = ModuleSchema::from_str(
//!     "<executable><parameters>\
//!        <image><name>f</name><flag>f</flag></image>\
//!        <boolean><name>verbose</name><longflag>verbose</longflag></boolean>\
//!      </parameters></executable>",
//! )?;
//!
//! let arguments = parse_from(&schema, ["elastix-cli", "-f", "image.nii", "--verbose"])?;
//! assert_eq!(to_flag_tokens(&arguments), ["-f image.nii", "-verbose"]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

pub mod arguments;
pub mod cli;
pub mod config;
pub mod error;
pub mod launcher;
pub mod schema;
pub mod translate;

use crate::arguments::ParsedArguments;
use crate::config::Config;
use crate::error::LaunchError;
use crate::launcher::{ExitOutcome, Invocation, DEFAULT_EXECUTABLE};
use crate::translate::to_flag_tokens;
use anyhow::Context;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

/// Entry point of the binary.
pub fn run() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let config = Config::load().context("Failed to load wrapper configuration")?;
    let schema = config
        .load_schema()
        .context("Failed to load module schema")?;

    let argv: Vec<OsString> = std::env::args_os().collect();
    if cli::requests_xml(&argv) {
        io::stdout()
            .write_all(schema.raw.as_bytes())
            .context("Failed to write module schema to stdout")?;
        return Ok(ExitCode::SUCCESS);
    }

    let arguments = cli::parse_from(&schema, argv).unwrap_or_else(|err| err.exit());
    let outcome = launch(Path::new(DEFAULT_EXECUTABLE), &arguments)?;

    Ok(to_exit_code(outcome))
}

/// Runs `executable` with the flag tokens of `arguments` and waits for it.
pub fn launch(
    executable: &Path,
    arguments: &ParsedArguments,
) -> Result<ExitOutcome, LaunchError> {
    Invocation::new(executable, to_flag_tokens(arguments)).run()
}

fn to_exit_code(outcome: ExitOutcome) -> ExitCode {
    exit_byte(outcome).map_or(ExitCode::FAILURE, ExitCode::from)
}

/// The child's status as a process exit byte, if it fits in one.
fn exit_byte(outcome: ExitOutcome) -> Option<u8> {
    u8::try_from(outcome.exit_code()).ok()
}

//! Runs the external executable and reports how it ended.

use crate::error::LaunchError;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Where elastix is installed in the module's container image.
pub const DEFAULT_EXECUTABLE: &str = "/elastix-rel/bin/elastix";

/// How the child process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    /// Terminated by a signal (Unix only).
    Signaled(i32),
}

impl ExitOutcome {
    pub fn success(self) -> bool {
        self == ExitOutcome::Exited(0)
    }

    /// The status the wrapper should exit with. Signals follow the shell
    /// convention of `128 + signal`.
    pub fn exit_code(self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(signal) => 128 + signal,
        }
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signaled(signal);
            }
        }

        ExitOutcome::Exited(1)
    }
}

/// One blocking run of an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Spawns the program with inherited stdio and waits for it to finish.
    ///
    /// A non-zero exit is not an error here; it comes back as the outcome.
    pub fn run(&self) -> Result<ExitOutcome, LaunchError> {
        log::info!(
            "launching {} with {} argument(s)",
            self.program.display(),
            self.args.len()
        );
        log::debug!("arguments: {:?}", self.args);

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let outcome = ExitOutcome::from(status);
        if outcome.success() {
            log::debug!("{} finished successfully", self.program.display());
        } else {
            log::warn!(
                "{} exited with status {}",
                self.program.display(),
                outcome.exit_code()
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_a_launch_error_naming_the_path() {
        let invocation = Invocation::new("/definitely/not/here/elastix", vec!["-f a.nii".into()]);
        let err = invocation.run().unwrap_err();

        let LaunchError::Spawn { program, source } = &err;
        assert_eq!(program, Path::new("/definitely/not/here/elastix"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/definitely/not/here/elastix"));
    }

    #[test]
    fn signal_outcomes_map_above_128() {
        assert_eq!(ExitOutcome::Signaled(9).exit_code(), 137);
        assert_eq!(ExitOutcome::Exited(2).exit_code(), 2);
        assert!(ExitOutcome::Exited(0).success());
        assert!(!ExitOutcome::Signaled(15).success());
    }

    #[cfg(unix)]
    #[test]
    fn reports_child_exit_status() {
        let invocation = Invocation::new("/bin/sh", vec!["-c".into(), "exit 2".into()]);
        assert_eq!(invocation.run().unwrap(), ExitOutcome::Exited(2));

        let invocation = Invocation::new("/bin/sh", vec!["-c".into(), "exit 0".into()]);
        assert!(invocation.run().unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn reports_terminating_signal() {
        let invocation = Invocation::new("/bin/sh", vec!["-c".into(), "kill -TERM $$".into()]);
        assert_eq!(invocation.run().unwrap(), ExitOutcome::Signaled(15));
    }
}

// ABOUTME: Supervised execution of container CLI commands.
// ABOUTME: Streams merged stdout/stderr while a watchdog polls daemon liveness.

mod capture;
mod error;
mod runner;

pub use capture::capture;
pub use error::ProcessError;
pub use runner::{DEFAULT_PROBE_INTERVAL, DaemonLossPolicy, Runner};

use std::path::PathBuf;

/// A single external command to launch.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Executable to spawn.
    pub program: PathBuf,
    /// Arguments, passed through verbatim.
    pub args: Vec<String>,
    /// Working directory. `None` inherits the caller's.
    pub workdir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            workdir: None,
        }
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Program and arguments joined by single spaces, for display only.
    pub fn command_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.to_string_lossy().into_owned());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Outcome of running an [`Invocation`].
///
/// `output` holds whatever was captured before the run ended, including
/// when `error` is set.
#[derive(Debug)]
pub struct CommandResult {
    pub command: String,
    pub output: String,
    pub error: Option<ProcessError>,
}

impl CommandResult {
    pub(crate) fn succeeded(command: String, output: String) -> Self {
        Self {
            command,
            output,
            error: None,
        }
    }

    pub(crate) fn failed(command: String, output: String, error: ProcessError) -> Self {
        Self {
            command,
            output,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the diagnostics and keep only output or error.
    pub fn into_result(self) -> Result<String, ProcessError> {
        match self.error {
            None => Ok(self.output),
            Some(err) => Err(err),
        }
    }
}

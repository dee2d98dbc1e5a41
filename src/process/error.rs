// ABOUTME: Error types for supervised command execution.
// ABOUTME: Distinguishes launch failures, daemon loss, and unsuccessful exits.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("Lost connection to Docker daemon")]
    DaemonLost,

    #[error("command exited with {0}")]
    Exit(ExitStatus),

    #[error("output reader failed: {0}")]
    Reader(String),

    #[error("failed to wait for command: {0}")]
    Wait(#[source] io::Error),

    #[error("Unable to determine working directory: {0}")]
    WorkingDirectory(#[source] io::Error),
}

impl ProcessError {
    /// Exit code of a process that ran to completion unsuccessfully.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Exit(status) => status.code(),
            _ => None,
        }
    }
}

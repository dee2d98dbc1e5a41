// ABOUTME: Application-wide error types for dockwrap.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::client::ClientError;
use crate::process::ProcessError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("`{command}` failed: {source}")]
    Command {
        command: String,
        source: ProcessError,
    },

    #[error("container daemon is not reachable")]
    DaemonUnreachable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

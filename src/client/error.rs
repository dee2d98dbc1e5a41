// ABOUTME: Client error types with SNAFU pattern.
// ABOUTME: Unifies detection, command, and image resolution failures.

use snafu::Snafu;

use crate::process::ProcessError;
use crate::runtime::DetectionError;

/// Unified error for client facade operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    #[snafu(display("environment detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("`{command}` failed: {source}"))]
    Command {
        command: String,
        source: ProcessError,
    },

    #[snafu(display("Multiple IDs returned for image: {image}"))]
    AmbiguousImage { image: String, count: usize },

    #[snafu(display("no image found matching: {image}"))]
    ImageNotFound { image: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// The CLI executable could not be located.
    ExecutableNotFound,
    /// The daemon stopped responding during a command.
    DaemonLost,
    /// A command could not start or exited unsuccessfully.
    CommandFailed,
    /// An image query matched more than one image.
    AmbiguousImage,
    /// An image query matched nothing.
    ImageNotFound,
}

impl ClientError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ClientErrorKind {
        match self {
            // Cgroup read failures never reach the caller; only executable lookup does.
            ClientError::Detection { .. } => ClientErrorKind::ExecutableNotFound,
            ClientError::Command { source, .. } => match source {
                ProcessError::DaemonLost => ClientErrorKind::DaemonLost,
                _ => ClientErrorKind::CommandFailed,
            },
            ClientError::AmbiguousImage { .. } => ClientErrorKind::AmbiguousImage,
            ClientError::ImageNotFound { .. } => ClientErrorKind::ImageNotFound,
        }
    }
}

impl From<DetectionError> for ClientError {
    fn from(source: DetectionError) -> Self {
        ClientError::Detection { source }
    }
}

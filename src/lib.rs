// ABOUTME: Library root for dockwrap - a supervised client for the container CLI.
// ABOUTME: The main binary is in main.rs.

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod probe;
pub mod process;
pub mod runtime;

pub use client::{ClientConfig, ClientError, DockerClient};
pub use process::{CommandResult, Invocation, ProcessError};

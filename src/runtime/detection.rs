// ABOUTME: Executable lookup and parent container detection.
// ABOUTME: Scans cgroup metadata of PID 1 for a Docker container ID.

use super::types::RuntimeType;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Cgroup metadata of the init process.
pub const CGROUP_PATH: &str = "/proc/1/cgroup";

// Matches `.../docker/<id>` (cgroupfs driver) and `.../docker-<id>.scope` (systemd driver).
static CONTAINER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/docker[/-]([0-9a-f]+)(?:\.scope)?$").expect("container id pattern is valid")
});

/// Error during environment detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("{name} executable not found in PATH: {source}")]
    ExecutableNotFound {
        name: &'static str,
        source: which::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolve the CLI executable for `runtime` via PATH.
pub fn locate_executable(runtime: RuntimeType) -> Result<PathBuf, DetectionError> {
    let name = runtime.binary_name();
    let path = which::which(name)
        .map_err(|source| DetectionError::ExecutableNotFound { name, source })?;
    tracing::debug!("found {} at {}", name, path.display());
    Ok(path)
}

/// Detect the ID of the container this process runs in.
///
/// Returns `Ok(None)` when the metadata is readable but names no container.
pub fn detect_parent_container() -> Result<Option<String>, DetectionError> {
    detect_parent_container_from(Path::new(CGROUP_PATH))
}

/// Like [`detect_parent_container`], reading cgroup metadata from `path`.
pub fn detect_parent_container_from(path: &Path) -> Result<Option<String>, DetectionError> {
    let unreadable = |source| DetectionError::Unreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(unreadable)?;
        if let Some(id) = parse_container_id(&line) {
            tracing::debug!("running inside container {}", id);
            return Ok(Some(id.to_string()));
        }
    }

    Ok(None)
}

/// Extract a container ID from a single cgroup line.
pub fn parse_container_id(line: &str) -> Option<&str> {
    CONTAINER_ID
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

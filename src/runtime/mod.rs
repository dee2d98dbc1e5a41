// ABOUTME: Host environment detection for the container CLI client.
// ABOUTME: Locates the CLI executable and detects whether we run inside a container.

mod detection;
mod types;

pub use detection::{
    CGROUP_PATH, DetectionError, detect_parent_container, detect_parent_container_from,
    locate_executable, parse_container_id,
};
pub use types::RuntimeType;

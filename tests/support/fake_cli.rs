// ABOUTME: Scripted stand-in for the docker executable.
// ABOUTME: Records every invocation and answers with canned output.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A `docker` shell script living in its own temp directory.
pub struct FakeCli {
    dir: TempDir,
    path: PathBuf,
}

impl FakeCli {
    /// Healthy daemon; `images -q` prints `images` verbatim.
    pub fn new(images: &str) -> Self {
        Self::with_script(|log| {
            format!(
                r#"#!/bin/sh
echo "$*" >> "{log}"
case "$1" in
  info) exit 0 ;;
  images)
cat <<'IMAGES'
{images}IMAGES
    ;;
  push|pull) echo "$1 $2"; echo "progress on stderr" >&2 ;;
  tag) exit 0 ;;
  build) pwd -P; echo "Successfully built" ;;
  run) pwd -P ;;
  *) echo "unknown command: $1" >&2; exit 1 ;;
esac
"#
            )
        })
    }

    /// Every command fails as if the daemon were down.
    pub fn unreachable() -> Self {
        Self::with_script(|log| {
            format!(
                r#"#!/bin/sh
echo "$*" >> "{log}"
echo "Cannot connect to the Docker daemon" >&2
exit 1
"#
            )
        })
    }

    fn with_script(script: impl FnOnce(&str) -> String) -> Self {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("calls.log");
        let path = dir.path().join("docker");

        fs::write(&path, script(&log.display().to_string())).unwrap();

        // Make executable
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();

        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Argument lists of every invocation so far, in order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Whether any recorded invocation started with `subcommand`.
    pub fn was_called(&self, subcommand: &str) -> bool {
        self.calls()
            .iter()
            .any(|call| call.split_whitespace().next() == Some(subcommand))
    }
}

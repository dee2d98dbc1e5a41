// ABOUTME: Daemon liveness probing via the container CLI.
// ABOUTME: Provides the probe trait, the `info`-based probe, and the watchdog task.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::mpsc;

/// Reports whether the container daemon is reachable right now.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_connected(&self) -> bool;
}

/// Probes the daemon by running `<executable> info` and checking its exit status.
///
/// Stateless: every call spawns a fresh probe process.
#[derive(Debug, Clone)]
pub struct CliProbe {
    executable: PathBuf,
}

impl CliProbe {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

#[async_trait]
impl LivenessProbe for CliProbe {
    async fn is_connected(&self) -> bool {
        let status = Command::new(&self.executable)
            .arg("info")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!(
                    "liveness probe {} could not start: {}",
                    self.executable.display(),
                    e
                );
                false
            }
        }
    }
}

/// Probe immediately, then every `interval`, until the daemon is unreachable.
///
/// Sends a single signal on `lost` and returns at the first failed probe.
pub async fn watchdog(probe: Arc<dyn LivenessProbe>, interval: Duration, lost: mpsc::Sender<()>) {
    loop {
        if !probe.is_connected().await {
            tracing::warn!("container daemon liveness probe failed");
            let _ = lost.send(()).await;
            return;
        }
        tokio::time::sleep(interval).await;
    }
}

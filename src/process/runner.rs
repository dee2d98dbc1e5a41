// ABOUTME: Command runner with merged live output and daemon liveness watchdog.
// ABOUTME: Arbitrates between line arrival, stream completion, and daemon loss.

use super::{CommandResult, Invocation, ProcessError};
use crate::probe::{self, LivenessProbe};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Interval between daemon liveness probes while a command runs.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

const LINE_BUFFER: usize = 64;

/// What to do with the child process when the daemon goes away mid-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonLossPolicy {
    /// Leave the child running and reap it in the background.
    #[default]
    Abandon,
    /// Kill the child and wait for it before returning.
    Kill,
}

/// Launches commands and supervises them until exit or daemon loss.
pub struct Runner {
    probe: Arc<dyn LivenessProbe>,
    show_output: bool,
    probe_interval: Duration,
    on_daemon_loss: DaemonLossPolicy,
}

impl Runner {
    pub fn new(probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            probe,
            show_output: false,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            on_daemon_loss: DaemonLossPolicy::default(),
        }
    }

    /// Echo each captured line to our own stdout as it arrives.
    pub fn show_output(mut self, show: bool) -> Self {
        self.show_output = show;
        self
    }

    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    pub fn on_daemon_loss(mut self, policy: DaemonLossPolicy) -> Self {
        self.on_daemon_loss = policy;
        self
    }

    /// Run the invocation, streaming its merged output.
    ///
    /// Lines are concatenated without separators. If the liveness probe
    /// fails before the output streams close, the run ends immediately with
    /// [`ProcessError::DaemonLost`] and only the lines received so far.
    pub async fn run(&self, invocation: &Invocation) -> CommandResult {
        let command = invocation.command_string();

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = invocation.workdir {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                tracing::debug!(command = %command, "failed to start command: {}", source);
                let err = ProcessError::Spawn {
                    program: invocation.program.display().to_string(),
                    source,
                };
                return CommandResult::failed(command, String::new(), err);
            }
        };
        tracing::debug!(command = %command, pid = ?child.id(), "command started");

        let (line_tx, mut line_rx) = mpsc::channel::<String>(LINE_BUFFER);
        let (lost_tx, mut lost_rx) = mpsc::channel::<()>(1);

        let reader = tokio::spawn(read_merged(
            child.stdout.take(),
            child.stderr.take(),
            self.show_output.then(io::stdout),
            line_tx,
        ));
        let watchdog = tokio::spawn(probe::watchdog(
            Arc::clone(&self.probe),
            self.probe_interval,
            lost_tx,
        ));

        let mut output = String::new();
        let outcome = loop {
            tokio::select! {
                line = line_rx.recv() => match line {
                    Some(line) => output.push_str(&line),
                    None => break Ok(()),
                },
                Some(()) = lost_rx.recv() => break Err(ProcessError::DaemonLost),
            }
        };
        watchdog.abort();

        if let Err(err) = outcome {
            tracing::warn!(command = %command, "daemon became unreachable while command was running");
            self.release(child).await;
            return CommandResult::failed(command, output, err);
        }

        // A closed line channel only means completion if the reader ended cleanly.
        if let Err(e) = reader.await {
            tracing::warn!(command = %command, "output reader ended abnormally: {}", e);
            let _ = child.wait().await;
            return CommandResult::failed(command, output, ProcessError::Reader(e.to_string()));
        }

        match child.wait().await {
            Ok(status) if status.success() => CommandResult::succeeded(command, output),
            Ok(status) => {
                tracing::debug!(command = %command, status = %status, "command failed");
                CommandResult::failed(command, output, ProcessError::Exit(status))
            }
            Err(e) => CommandResult::failed(command, output, ProcessError::Wait(e)),
        }
    }

    /// Dispose of a child whose daemon went away.
    async fn release(&self, mut child: Child) {
        match self.on_daemon_loss {
            DaemonLossPolicy::Abandon => {
                tokio::spawn(async move {
                    let _ = child.wait().await;
                });
            }
            DaemonLossPolicy::Kill => {
                if let Err(e) = child.kill().await {
                    tracing::warn!("failed to kill command after daemon loss: {}", e);
                }
            }
        }
    }
}

/// Line reader that keeps partial data across cancelled reads.
struct LineSource<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Next line without its terminator, or `None` at end of stream.
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        let read = self.reader.read_until(b'\n', &mut self.pending).await?;
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }

        let mut line = std::mem::take(&mut self.pending);
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

async fn next_from<R: AsyncRead + Unpin>(source: &mut Option<LineSource<R>>) -> Option<String> {
    let current = source.as_mut()?;
    match current.next_line().await {
        Ok(Some(line)) => Some(line),
        Ok(None) => {
            *source = None;
            None
        }
        Err(e) => {
            tracing::debug!("output stream read failed: {}", e);
            *source = None;
            None
        }
    }
}

/// Merge two streams into one line feed, echoing each line to `echo` if set.
/// Dropping `lines` on return signals completion to the controller.
///
/// A failing echo sink is dropped; forwarding continues.
pub(super) async fn read_merged<O, E, W>(
    stdout: Option<O>,
    stderr: Option<E>,
    mut echo: Option<W>,
    lines: mpsc::Sender<String>,
) where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    W: Write,
{
    let mut stdout = stdout.map(LineSource::new);
    let mut stderr = stderr.map(LineSource::new);
    let mut forwarding = true;

    loop {
        let line = tokio::select! {
            line = next_from(&mut stdout), if stdout.is_some() => line,
            line = next_from(&mut stderr), if stderr.is_some() => line,
            else => break,
        };
        let Some(line) = line else { continue };

        if let Some(ref mut sink) = echo
            && let Err(e) = writeln!(sink, "{line}").and_then(|_| sink.flush())
        {
            tracing::debug!("live output echo disabled: {}", e);
            echo = None;
        }
        // Controller gone: keep draining so an abandoned child never blocks on a full pipe.
        if forwarding && lines.send(line).await.is_err() {
            forwarding = false;
        }
    }
}

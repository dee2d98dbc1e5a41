// ABOUTME: One-shot command execution without live echo or watchdog.
// ABOUTME: Used for short calls such as push, pull, images, and tag.

use super::runner::read_merged;
use super::{CommandResult, Invocation, ProcessError};
use std::io::Sink;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;

const LINE_BUFFER: usize = 64;

/// Run an invocation to completion and collect stdout and stderr
/// interleaved in arrival order, one newline-terminated line each.
pub async fn capture(invocation: &Invocation) -> CommandResult {
    let command = invocation.command_string();
    tracing::debug!(command = %command, "capturing command");

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
            let err = ProcessError::Spawn {
                program: invocation.program.display().to_string(),
                source,
            };
            return CommandResult::failed(command, String::new(), err);
        }
    };

    let (line_tx, mut line_rx) = mpsc::channel::<String>(LINE_BUFFER);
    let reader = read_merged(
        child.stdout.take(),
        child.stderr.take(),
        None::<Sink>,
        line_tx,
    );
    let collect = async {
        let mut text = String::new();
        while let Some(line) = line_rx.recv().await {
            text.push_str(&line);
            text.push('\n');
        }
        text
    };
    let ((), text) = tokio::join!(reader, collect);

    match child.wait().await {
        Ok(status) if status.success() => CommandResult::succeeded(command, text),
        Ok(status) => {
            tracing::debug!(command = %command, status = %status, "command failed");
            CommandResult::failed(command, text, ProcessError::Exit(status))
        }
        Err(e) => CommandResult::failed(command, text, ProcessError::Wait(e)),
    }
}

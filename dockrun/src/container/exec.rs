//! Exec sessions inside a running container.
//!
//! The runtime multiplexes stdout and stderr onto one attached stream. A
//! background task drains that stream into two buffers and signals the
//! caller over a oneshot channel when it is done; only then is the exec
//! inspected for its exit code.

use super::ExecResult;
use crate::portal::{ExecInspection, OutputChunk, OutputStream, RuntimeApi};
use crate::runtime::Controller;
use crate::runtime::constants::exec::{INSPECT_ATTEMPTS, INSPECT_INTERVAL_MS};
use crate::runtime::types::ContainerHandle;
use dockrun_shared::errors::{DockrunError, DockrunResult};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::oneshot;

/// Splits tagged runtime output into stdout and stderr buffers.
///
/// Console output (tty-attached exec) cannot be separated and lands in
/// stdout.
#[derive(Debug, Default)]
pub struct Demultiplexer {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Demultiplexer {
    pub fn route(&mut self, chunk: OutputChunk) {
        match chunk {
            OutputChunk::Stdout(data) | OutputChunk::Console(data) => {
                self.stdout.extend_from_slice(&data)
            }
            OutputChunk::Stderr(data) => self.stderr.extend_from_slice(&data),
        }
    }

    /// Route every chunk until the stream ends. A stream error aborts the copy.
    pub async fn drain(mut self, mut output: OutputStream, exec_id: &str) -> DockrunResult<Self> {
        while let Some(chunk) = output.next().await {
            match chunk {
                Ok(chunk) => self.route(chunk),
                Err(e) => {
                    tracing::debug!(exec_id, error = %e, "Exec output stream failed");
                    return Err(DockrunError::Exec {
                        target: exec_id.to_string(),
                        message: format!("output copy failed: {}", e),
                    });
                }
            }
        }

        tracing::trace!(
            exec_id,
            stdout_bytes = self.stdout.len(),
            stderr_bytes = self.stderr.len(),
            "Exec output drained"
        );
        Ok(self)
    }

    /// `(stdout, stderr)`, decoded lossily.
    pub fn into_strings(self) -> (String, String) {
        (
            String::from_utf8_lossy(&self.stdout).into_owned(),
            String::from_utf8_lossy(&self.stderr).into_owned(),
        )
    }
}

/// Run `command` inside `handle` and collect its demultiplexed output.
///
/// With a `deadline`, the copy is abandoned and a timeout returned once it
/// elapses.
pub(crate) async fn exec(
    controller: &Controller,
    handle: &ContainerHandle,
    command: &[String],
    deadline: Option<Duration>,
) -> DockrunResult<ExecResult> {
    if command.is_empty() {
        return Err(DockrunError::InvalidArgument(
            "exec command cannot be empty".to_string(),
        ));
    }

    let runtime = controller.runtime();
    let exec_id = runtime.create_exec(handle.id(), command).await?;
    tracing::debug!(container_id = %handle, exec_id = %exec_id, command = ?command, "Exec created");

    let output = runtime.start_exec(&exec_id).await?;

    let (done_tx, done_rx) = oneshot::channel();
    let copier = tokio::spawn({
        let exec_id = exec_id.clone();
        async move {
            let copied = Demultiplexer::default().drain(output, &exec_id).await;
            let _ = done_tx.send(copied);
        }
    });

    let signal = match deadline {
        Some(limit) => match tokio::time::timeout(limit, done_rx).await {
            Ok(signal) => signal,
            Err(_) => {
                copier.abort();
                tracing::warn!(exec_id = %exec_id, ?limit, "Exec deadline elapsed");
                return Err(DockrunError::Timeout {
                    operation: "exec",
                    after: limit,
                });
            }
        },
        None => done_rx.await,
    };

    let demuxed = signal.map_err(|_| {
        DockrunError::Internal(format!("exec {} copy task ended without a result", exec_id))
    })??;

    let exit_code = poll_exit_code(runtime.as_ref(), &exec_id).await?;
    let (stdout, stderr) = demuxed.into_strings();

    tracing::info!(container_id = %handle, exec_id = %exec_id, exit_code, "Exec finished");
    Ok(ExecResult {
        stdout,
        stderr,
        exit_code,
    })
}

/// Inspect the exec until the runtime stops reporting it as running.
async fn poll_exit_code(runtime: &dyn RuntimeApi, exec_id: &str) -> DockrunResult<i64> {
    let interval = Duration::from_millis(INSPECT_INTERVAL_MS);

    for attempt in 1..=INSPECT_ATTEMPTS {
        if let ExecInspection {
            running: false,
            exit_code: Some(code),
        } = runtime.inspect_exec(exec_id).await?
        {
            return Ok(code);
        }

        if attempt < INSPECT_ATTEMPTS {
            tokio::time::sleep(interval).await;
        }
    }

    Err(DockrunError::Exec {
        target: exec_id.to_string(),
        message: format!(
            "runtime reported no exit code after {} inspections",
            INSPECT_ATTEMPTS
        ),
    })
}

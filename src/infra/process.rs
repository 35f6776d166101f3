//! Subprocess spawning and output relaying
//!
//! Commands run through `sh -c` in the package directory. Output is
//! relayed line by line through tracing while the process runs; the exit
//! code decides success.

use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::error::ExecError;

/// Run a shell command in a package directory and wait for it to exit.
///
/// There is no timeout and no cancellation: the process runs to natural
/// exit, and a non-zero code is reported as [`ExecError::CommandFailed`].
pub async fn run_command(command: &str, cwd: &Path, package: &str) -> Result<(), ExecError> {
    tracing::info!("--->  Executing '{command}' on {package}");
    let started = Instant::now();

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecError::Spawn {
            package: package.to_string(),
            command: command.to_string(),
            error: e.to_string(),
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let out_task = tokio::spawn(relay_lines(stdout, package.to_string(), false));
    let err_task = tokio::spawn(relay_lines(stderr, package.to_string(), true));

    let status = child.wait().await.map_err(|e| ExecError::Spawn {
        package: package.to_string(),
        command: command.to_string(),
        error: e.to_string(),
    })?;

    // readers finish once the pipes close
    let _ = out_task.await;
    let _ = err_task.await;

    tracing::info!(
        "<---  End of '{command}' on {package}, code: {:?} / {} ms",
        status.code(),
        started.elapsed().as_millis()
    );

    if status.success() {
        Ok(())
    } else {
        Err(ExecError::CommandFailed {
            package: package.to_string(),
            command: command.to_string(),
            code: status.code(),
        })
    }
}

async fn relay_lines<R: AsyncRead + Unpin>(reader: Option<R>, package: String, is_err: bool) {
    let Some(reader) = reader else {
        return;
    };
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_err {
            tracing::warn!("[{package}] {line}");
        } else {
            tracing::info!("[{package}] {line}");
        }
    }
}

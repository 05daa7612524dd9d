//! Metrics command execution and exit status classification.
//!
//! The command's stdout and stderr are captured into a single buffer in
//! the order the chunks arrive. Exit status 10 is the command's way of
//! saying it has nothing to report yet.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use crate::error::{ProcessError, ProcessResult};

/// Exit status the metrics command uses to signal "not ready yet".
pub const NOT_READY_EXIT_CODE: i32 = 10;

/// Result of one metrics command invocation.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// Exit status 0.
    Success(Vec<u8>),
    /// Exit status 10.
    NotReady(Vec<u8>),
    /// Any other exit status, including termination by signal.
    Failure { output: Vec<u8>, status: ExitStatus },
}

impl ExecutionOutcome {
    fn classify(status: ExitStatus, output: Vec<u8>) -> Self {
        match status.code() {
            Some(0) => Self::Success(output),
            Some(NOT_READY_EXIT_CODE) => Self::NotReady(output),
            _ => Self::Failure { output, status },
        }
    }

    pub fn output(&self) -> &[u8] {
        match self {
            Self::Success(output) | Self::NotReady(output) => output.as_slice(),
            Self::Failure { output, .. } => output.as_slice(),
        }
    }
}

/// Run `command` with `args` and wait for it to exit.
///
/// Returns `ProcessError::Launch` only when the process could not be
/// started or its output could not be collected; every exit status maps
/// to an `ExecutionOutcome`.
pub async fn run(command: &Path, args: &[String]) -> ProcessResult<ExecutionOutcome> {
    let launch_error = |source| ProcessError::Launch {
        command: command.display().to_string(),
        source,
    };

    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(launch_error)?;

    debug!(command = %command.display(), pid = ?child.id(), "metrics command started");

    let output = match (child.stdout.take(), child.stderr.take()) {
        (Some(stdout), Some(stderr)) => read_combined(stdout, stderr).await.map_err(launch_error)?,
        _ => Vec::new(),
    };
    let status = child.wait().await.map_err(launch_error)?;

    debug!(%status, bytes = output.len(), "metrics command exited");
    Ok(ExecutionOutcome::classify(status, output))
}

/// Drain both pipes into one buffer until each reaches EOF.
async fn read_combined<O, E>(mut stdout: O, mut stderr: E) -> std::io::Result<Vec<u8>>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut combined = Vec::new();
    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            n = stdout.read(&mut out_buf), if out_open => {
                let n = n?;
                if n == 0 {
                    out_open = false;
                } else {
                    combined.extend_from_slice(&out_buf[..n]);
                }
            }
            n = stderr.read(&mut err_buf), if err_open => {
                let n = n?;
                if n == 0 {
                    err_open = false;
                } else {
                    combined.extend_from_slice(&err_buf[..n]);
                }
            }
        }
    }

    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn exit_zero_is_success_with_output() {
        let outcome = run(Path::new("sh"), &sh("printf '[]'")).await.unwrap();
        match outcome {
            ExecutionOutcome::Success(output) => assert_eq!(output, b"[]"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exit_ten_is_not_ready() {
        let outcome = run(Path::new("sh"), &sh("echo warming up; exit 10")).await.unwrap();
        match outcome {
            ExecutionOutcome::NotReady(output) => assert_eq!(output, b"warming up\n"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_nonzero_exit_is_failure() {
        for code in [1, 2, 11, 255] {
            let outcome = run(Path::new("sh"), &sh(&format!("exit {code}"))).await.unwrap();
            match outcome {
                ExecutionOutcome::Failure { status, .. } => assert_eq!(status.code(), Some(code)),
                other => panic!("unexpected outcome for {code}: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn killed_by_signal_is_failure() {
        let outcome = run(Path::new("sh"), &sh("kill -9 $$")).await.unwrap();
        match outcome {
            ExecutionOutcome::Failure { status, .. } => assert_eq!(status.code(), None),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stdout_and_stderr_are_combined() {
        let outcome = run(Path::new("sh"), &sh("echo out; echo err 1>&2; exit 3"))
            .await
            .unwrap();
        let output = String::from_utf8_lossy(outcome.output()).to_string();
        assert!(output.contains("out\n"));
        assert!(output.contains("err\n"));
    }

    #[tokio::test]
    async fn args_are_passed_in_order() {
        let args = vec![
            "-c".to_string(),
            "printf '%s,' \"$@\"".to_string(),
            "sh".to_string(),
            "first".to_string(),
            "--second".to_string(),
        ];
        let outcome = run(Path::new("sh"), &args).await.unwrap();
        assert_eq!(outcome.output(), b"first,--second,");
    }

    #[tokio::test]
    async fn missing_command_is_a_launch_error() {
        let err = run(Path::new("/nonexistent/metrics-cmd"), &[]).await.unwrap_err();
        match err {
            ProcessError::Launch { command, .. } => assert_eq!(command, "/nonexistent/metrics-cmd"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn large_output_is_captured_fully() {
        let outcome = run(Path::new("sh"), &sh("head -c 200000 /dev/zero")).await.unwrap();
        assert_eq!(outcome.output().len(), 200_000);
    }
}

//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` runs external tools through `tokio::process` with a
//! hard deadline. On expiry the child is killed and the error is a
//! [`BoundaryError::Timeout`], so callers can tell a hang from a failure.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Child;

use crate::application::ports::CommandRunner;
use crate::domain::BoundaryError;

/// Deadline for local queries: `docker ps/inspect/info`, `git`, mount checks.
pub const QUICK_CMD_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for operations that create or remove heavyweight resources:
/// container run/stop/kill/rm, volume attach/detach.
pub const HEAVY_CMD_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline for formatting a new encrypted volume.
pub const VOLUME_CREATE_TIMEOUT: Duration = Duration::from_secs(300);

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output()` only drops the future and can
/// leave the process running, so the deadline is raced with `tokio::select!`
/// and the child is killed explicitly.
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, timeout_secs = timeout.as_secs(), "running command");
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        collect(child, program, args, timeout, None).await
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output> {
        tracing::debug!(program, ?args, "running command with piped stdin");
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;
        collect(child, program, args, self.timeout, Some(input)).await
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus> {
        tracing::debug!(program, ?args, "running interactive command");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))
    }
}

/// Feed `input`, drain both pipes, and race the whole thing against `timeout`.
async fn collect(
    mut child: Child,
    program: &str,
    args: &[&str],
    timeout: Duration,
    input: Option<&[u8]>,
) -> Result<Output> {
    let stdin_handle = child.stdin.take();
    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    tokio::select! {
        result = async {
            let (status, stdout, stderr, ()) = tokio::join!(
                child.wait(),
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stdout_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stderr_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    // Dropping the handle closes the pipe so the child sees EOF.
                    if let (Some(mut stdin), Some(bytes)) = (stdin_handle, input) {
                        let _ = stdin.write_all(bytes).await;
                    }
                },
            );
            Ok(Output {
                status: status.with_context(|| format!("waiting for {program}"))?,
                stdout,
                stderr,
            })
        } => result,
        () = tokio::time::sleep(timeout) => {
            let _ = child.kill().await;
            tracing::warn!(program, ?args, "command timed out, child killed");
            Err(BoundaryError::Timeout {
                step: step_name(program, args),
                after: timeout,
            }
            .into())
        }
    }
}

/// `docker stop`, `hdiutil attach`: the program plus its subcommand.
fn step_name(program: &str, args: &[&str]) -> String {
    match args.first() {
        Some(sub) if !sub.starts_with('-') => format!("{program} {sub}"),
        _ => program.to_string(),
    }
}

/// Turn a non-zero exit into a [`BoundaryError::Failed`] carrying the tool's
/// raw stderr (or stdout when stderr is empty).
///
/// # Errors
///
/// Returns an error when `output.status` is not success.
pub fn ensure_success(step: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    };
    let detail = if detail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        detail
    };
    Err(BoundaryError::Failed {
        step: step.to_string(),
        detail,
    }
    .into())
}

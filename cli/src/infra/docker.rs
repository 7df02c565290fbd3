//! Infrastructure implementation of the `ContainerBoundary` port.
//!
//! `DockerCli<R>` routes every container operation through the `docker` CLI
//! via a `CommandRunner`. Queries use the quick runner, lifecycle changes the
//! heavy one.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ContainerBoundary};
use crate::domain::container::{CONTAINER_HOME, VOLUME_TARGET, WORKSPACE_TARGET};
use crate::domain::{BoundaryError, ContainerConfig};
use crate::infra::command_runner::{
    HEAVY_CMD_TIMEOUT, QUICK_CMD_TIMEOUT, TokioCommandRunner, ensure_success,
};

const DOCKER: &str = "docker";

/// Container adapter backed by the `docker` CLI.
///
/// Generic over `R: CommandRunner` so tests can inject a mock runner without
/// spawning real processes.
pub struct DockerCli<R: CommandRunner> {
    quick: R,
    heavy: R,
}

impl<R: CommandRunner> DockerCli<R> {
    pub fn new(quick: R, heavy: R) -> Self {
        Self { quick, heavy }
    }
}

impl DockerCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(
            TokioCommandRunner::new(QUICK_CMD_TIMEOUT),
            TokioCommandRunner::new(HEAVY_CMD_TIMEOUT),
        )
    }
}

/// `docker ps` name filter matching exactly `name`.
///
/// Docker treats the filter value as a regular expression, so the name is
/// escaped and anchored.
#[must_use]
pub fn name_filter(name: &str) -> String {
    format!("name=^{}$", regex::escape(name))
}

/// `docker run` arguments for `config`.
///
/// The container idles on `tail -f /dev/null` so sessions attach with `exec`.
#[must_use]
pub fn run_args(config: &ContainerConfig) -> Vec<String> {
    vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        config.name().to_string(),
        "--mount".to_string(),
        format!(
            "type=bind,source={},target={VOLUME_TARGET}",
            config.volume_mount_point().display()
        ),
        "--mount".to_string(),
        format!(
            "type=bind,source={},target={WORKSPACE_TARGET}",
            config.workspace().display()
        ),
        "-w".to_string(),
        WORKSPACE_TARGET.to_string(),
        "-e".to_string(),
        format!("HOME={CONTAINER_HOME}"),
        "--entrypoint".to_string(),
        "tail".to_string(),
        config.image().to_string(),
        "-f".to_string(),
        "/dev/null".to_string(),
    ]
}

impl<R: CommandRunner> ContainerBoundary for DockerCli<R> {
    async fn daemon_available(&self) -> Result<()> {
        let output = self
            .quick
            .run(DOCKER, &["info", "--format", "{{.ServerVersion}}"])
            .await
            .context("docker info")?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(BoundaryError::DaemonUnavailable(stderr).into())
    }

    async fn image_exists(&self, image: &str) -> bool {
        self.quick
            .run(DOCKER, &["image", "inspect", image])
            .await
            .is_ok_and(|o| o.status.success())
    }

    async fn exists(&self, name: &str) -> bool {
        let filter = name_filter(name);
        match self.quick.run(DOCKER, &["ps", "-a", "-q", "-f", &filter]).await {
            Ok(o) if o.status.success() => !String::from_utf8_lossy(&o.stdout).trim().is_empty(),
            Ok(o) => {
                tracing::debug!(
                    container = name,
                    stderr = %String::from_utf8_lossy(&o.stderr).trim(),
                    "docker ps failed, treating container as absent",
                );
                false
            }
            Err(e) => {
                tracing::debug!(container = name, error = %e, "docker ps unavailable");
                false
            }
        }
    }

    async fn running(&self, name: &str) -> bool {
        match self
            .quick
            .run(DOCKER, &["inspect", "-f", "{{.State.Running}}", name])
            .await
        {
            Ok(o) if o.status.success() => String::from_utf8_lossy(&o.stdout).trim() == "true",
            _ => false,
        }
    }

    async fn run(&self, config: &ContainerConfig) -> Result<()> {
        let args = run_args(config);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.heavy.run(DOCKER, &args).await.context("docker run")?;
        ensure_success("docker run", &output)
    }

    async fn stop(&self, name: &str, grace: Duration) -> Result<()> {
        let secs = grace.as_secs().to_string();
        // The runner deadline must outlast docker's own grace period.
        let deadline = HEAVY_CMD_TIMEOUT + grace;
        let output = self
            .heavy
            .run_with_timeout(DOCKER, &["stop", "-t", &secs, name], deadline)
            .await
            .context("docker stop")?;
        ensure_success("docker stop", &output)
    }

    async fn kill(&self, name: &str) -> Result<()> {
        let output = self
            .heavy
            .run(DOCKER, &["kill", name])
            .await
            .context("docker kill")?;
        ensure_success("docker kill", &output)
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let output = self
            .heavy
            .run(DOCKER, &["rm", "-f", name])
            .await
            .context("docker rm")?;
        ensure_success("docker rm", &output)
    }

    async fn exec_interactive(&self, name: &str, shell: &str) -> Result<()> {
        let status = self
            .heavy
            .run_status(DOCKER, &["exec", "-it", name, shell])
            .await
            .context("docker exec")?;
        // A shell that exits non-zero after a user session is not a tool failure,
        // except for docker's own codes (125-127).
        if matches!(status.code(), Some(125..=127)) {
            return Err(BoundaryError::Failed {
                step: "docker exec".to_string(),
                detail: format!("exited with {status}"),
            }
            .into());
        }
        Ok(())
    }
}

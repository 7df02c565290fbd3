//! Application service — session start use-case.
//!
//! Drives the environment from any observed state to `Ready`:
//! mount, fresh container, readiness poll, docs link, verify, attach.
//! Every step re-uses what is already in place, so a second `start` with no
//! external change is a no-op that still succeeds.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{
    ContainerBoundary, ProgressReporter, SecretProvider, SymlinkManager, VolumeBoundary,
};
use crate::application::services::detect::{DetectTarget, detect};
use crate::application::services::readiness::{RetryPolicy, wait_until_running};
use crate::application::services::volume_lock::ensure_mounted;
use crate::domain::{BoundaryError, ContainerConfig, EnvironmentState, Session, SessionError};

pub struct StartOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub session: &'a Session,
    pub retry: RetryPolicy,
    /// Hand the terminal to the container shell once ready.
    pub attach: bool,
}

/// What `start_session` changed on the way to `Ready`.
#[derive(Debug)]
pub struct StartReport {
    /// This call mounted the volume.
    pub mounted: bool,
    /// This call created a fresh container.
    pub container_started: bool,
    /// Target of the docs link.
    pub link_target: PathBuf,
    /// Verified snapshot taken before any attach.
    pub state: EnvironmentState,
}

impl StartReport {
    /// `true` when nothing needed to change.
    #[must_use]
    pub fn already_ready(&self) -> bool {
        !self.mounted && !self.container_started
    }
}

/// Bring the session to `Ready`, then optionally attach.
///
/// # Errors
///
/// Returns an error naming the failing step: missing volume, mount, daemon or
/// image preflight, container run, readiness, docs link, verification, or the
/// interactive session.
pub async fn start_session(
    volumes: &impl VolumeBoundary,
    containers: &impl ContainerBoundary,
    links: &impl SymlinkManager,
    secrets: &impl SecretProvider,
    opts: StartOptions<'_, impl ProgressReporter>,
) -> Result<StartReport> {
    let StartOptions {
        reporter,
        session,
        retry,
        attach,
    } = opts;
    let target = DetectTarget {
        volume_path: &session.volume_path,
        container_name: &session.container_name,
        workspace: &session.workspace,
    };
    let before = detect(volumes, containers, links, target).await;
    tracing::info!(phase = before.phase().as_str(), project = %session.project, "starting session");
    if before.symlink_broken {
        reporter.warn("_docs link is broken, relinking");
    }

    // Step 1: volume.
    let (mount_point, mounted) = ensure_mounted(volumes, secrets, reporter, &before).await?;

    // Step 2: container, always fresh against the current mount.
    let container_started = if before.container_running {
        false
    } else {
        launch_container(containers, reporter, session, &mount_point, before.container_exists)
            .await?;
        true
    };

    // Step 3: wait for it.
    wait_until_running(containers, &session.container_name, retry)
        .await
        .context("wait for container")?;

    // Step 4: docs link.
    let link_target = links
        .link(&session.workspace, &mount_point, &session.project)
        .context("link docs directory")?;

    // Step 5: verify.
    let state = detect(volumes, containers, links, target).await;
    verify_ready(&state)?;

    let report = StartReport {
        mounted,
        container_started,
        link_target,
        state,
    };
    if report.already_ready() {
        reporter.success(&format!("{} already running", session.container_name));
    } else {
        reporter.success(&format!("{} ready", session.container_name));
    }

    // Step 6: hand over the terminal.
    if attach {
        containers
            .exec_interactive(&session.container_name, &session.shell)
            .await
            .context("interactive session")?;
    }
    Ok(report)
}

async fn launch_container(
    containers: &impl ContainerBoundary,
    reporter: &impl ProgressReporter,
    session: &Session,
    mount_point: &std::path::Path,
    stale: bool,
) -> Result<()> {
    // Validate before touching the runtime.
    let config = ContainerConfig::new(
        &session.image,
        &session.container_name,
        mount_point,
        &session.workspace,
    )?;

    containers
        .daemon_available()
        .await
        .context("check container runtime")?;
    if !containers.image_exists(config.image()).await {
        return Err(BoundaryError::ImageNotFound(config.image().to_string()).into());
    }

    if stale {
        reporter.warn(&format!("{} is stopped, replacing it", config.name()));
        containers
            .remove(config.name())
            .await
            .with_context(|| format!("remove stale container {}", config.name()))?;
    }

    reporter.step(&format!("starting {}...", config.name()));
    containers
        .run(&config)
        .await
        .with_context(|| format!("run container {}", config.name()))?;
    tracing::info!(container = config.name(), image = config.image(), "container started");
    Ok(())
}

fn verify_ready(state: &EnvironmentState) -> Result<()> {
    if !state.volume_mounted {
        return Err(SessionError::VerificationFailed {
            step: "start",
            expected: "volume mounted",
        }
        .into());
    }
    if !state.container_running {
        return Err(SessionError::VerificationFailed {
            step: "start",
            expected: "container running",
        }
        .into());
    }
    if !state.symlink_healthy() {
        return Err(SessionError::VerificationFailed {
            step: "start",
            expected: "docs link resolves",
        }
        .into());
    }
    Ok(())
}

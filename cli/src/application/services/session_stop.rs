//! Application service — stop the session container.
//!
//! The volume is left mounted: stopping is frequent and should not cost the
//! user a password prompt.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{
    ContainerBoundary, ProgressReporter, SymlinkManager, VolumeBoundary,
};
use crate::application::services::detect::{DetectTarget, detect};
use crate::domain::{EnvironmentState, Session, SessionError};

/// What `halt_container` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltOutcome {
    /// No container record existed.
    Absent,
    /// A stopped container record was removed.
    RemovedStale,
    /// A running container was stopped and removed.
    Stopped,
}

/// Outcome of the `stop_session` use-case.
#[derive(Debug)]
pub struct StopReport {
    pub halt: HaltOutcome,
    pub state: EnvironmentState,
}

/// Stop the container if it runs, then remove its record.
///
/// A failed graceful stop falls back to a forced kill. The operation fails
/// only if the container is still running after both attempts, and the error
/// carries both causes.
///
/// # Errors
///
/// Returns [`SessionError::StopFailed`] when the container cannot be brought
/// down, or a boundary error when the record cannot be removed.
pub async fn halt_container(
    containers: &impl ContainerBoundary,
    name: &str,
    grace: Duration,
) -> Result<HaltOutcome> {
    if !containers.exists(name).await {
        return Ok(HaltOutcome::Absent);
    }

    let outcome = if containers.running(name).await {
        if let Err(stop_err) = containers.stop(name, grace).await {
            tracing::warn!(container = name, error = %stop_err, "graceful stop failed, killing");
            if let Err(kill_err) = containers.kill(name).await {
                if containers.running(name).await {
                    return Err(SessionError::StopFailed {
                        name: name.to_string(),
                        stop: format!("{stop_err:#}"),
                        kill: format!("{kill_err:#}"),
                    }
                    .into());
                }
                tracing::debug!(container = name, "kill failed but container is no longer running");
            }
        }
        HaltOutcome::Stopped
    } else {
        HaltOutcome::RemovedStale
    };

    containers
        .remove(name)
        .await
        .with_context(|| format!("remove container {name}"))?;
    tracing::info!(container = name, ?outcome, "container halted");
    Ok(outcome)
}

/// Stop and remove the session container, leaving the volume mounted.
///
/// Idempotent: with no container present it only re-detects.
///
/// # Errors
///
/// Returns an error if the container cannot be stopped or removed, or if it
/// still exists afterwards.
pub async fn stop_session(
    volumes: &impl VolumeBoundary,
    containers: &impl ContainerBoundary,
    links: &impl SymlinkManager,
    reporter: &impl ProgressReporter,
    session: &Session,
) -> Result<StopReport> {
    let target = DetectTarget {
        volume_path: &session.volume_path,
        container_name: &session.container_name,
        workspace: &session.workspace,
    };
    let before = detect(volumes, containers, links, target).await;
    if before.container_exists {
        reporter.step(&format!("stopping {}...", session.container_name));
    }

    let halt = halt_container(containers, &session.container_name, session.stop_grace).await?;

    let state = detect(volumes, containers, links, target).await;
    if state.container_exists {
        return Err(SessionError::VerificationFailed {
            step: "stop",
            expected: "container record removed",
        }
        .into());
    }

    match halt {
        HaltOutcome::Absent => reporter.success("no container to stop"),
        HaltOutcome::RemovedStale => reporter.success("removed stopped container"),
        HaltOutcome::Stopped => reporter.success("container stopped"),
    }
    Ok(StopReport { halt, state })
}

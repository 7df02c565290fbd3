//! Application service — encrypted volume use-cases: init, unlock, lock.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    ContainerBoundary, ProgressReporter, SecretProvider, SymlinkManager, VolumeBoundary,
};
use crate::application::services::detect::{DetectTarget, detect};
use crate::application::services::session_stop::{HaltOutcome, halt_container};
use crate::domain::volume::validate_volume_size;
use crate::domain::{EnvironmentState, PreconditionError, Session, SessionError};

/// Pause between stopping a container and unmounting, so the runtime drops
/// its bind-mount references.
pub const MOUNT_RELEASE_DELAY: Duration = Duration::from_secs(1);

const PASSWORD_PROMPT: &str = "Volume password";

// ── init ─────────────────────────────────────────────────────────────────────

/// Create a new encrypted volume.
///
/// # Errors
///
/// Returns a precondition error for an out-of-range size or an existing
/// volume (both checked before asking for a password), or a boundary error
/// from the volume tool.
pub async fn create_volume(
    volumes: &impl VolumeBoundary,
    secrets: &impl SecretProvider,
    reporter: &impl ProgressReporter,
    path: &Path,
    size_gb: u32,
) -> Result<PathBuf> {
    validate_volume_size(size_gb)?;
    if volumes.exists(path) {
        return Err(PreconditionError::VolumeAlreadyExists(path.to_path_buf()).into());
    }

    let secret = secrets.secret(PASSWORD_PROMPT, true)?;
    reporter.step(&format!("creating {size_gb} GB encrypted volume..."));
    volumes
        .create(path, size_gb, &secret)
        .await
        .context("create volume")?;

    if !volumes.exists(path) {
        return Err(SessionError::VerificationFailed {
            step: "create volume",
            expected: "volume file present",
        }
        .into());
    }
    reporter.success(&format!("volume created at {}", path.display()));
    Ok(path.to_path_buf())
}

// ── unlock ───────────────────────────────────────────────────────────────────

/// Outcome of the `unlock_volume` use-case.
#[derive(Debug)]
pub enum UnlockOutcome {
    /// The volume was already mounted.
    AlreadyUnlocked { state: EnvironmentState },
    /// The volume was mounted by this call.
    Unlocked { state: EnvironmentState },
}

impl UnlockOutcome {
    #[must_use]
    pub fn state(&self) -> &EnvironmentState {
        match self {
            Self::AlreadyUnlocked { state } | Self::Unlocked { state } => state,
        }
    }
}

/// Mount the volume when `state` says it is not mounted.
///
/// The secret is only requested when a mount is actually needed. Returns the
/// live mount point and whether this call mounted it.
pub(crate) async fn ensure_mounted(
    volumes: &impl VolumeBoundary,
    secrets: &impl SecretProvider,
    reporter: &impl ProgressReporter,
    state: &EnvironmentState,
) -> Result<(PathBuf, bool)> {
    if let Some(mount_point) = state.mount_point() {
        return Ok((mount_point.to_path_buf(), false));
    }
    if !state.volume_exists {
        return Err(PreconditionError::VolumeMissing(state.volume_path.clone()).into());
    }

    let secret = secrets.secret(PASSWORD_PROMPT, false)?;
    reporter.step("unlocking encrypted volume...");
    let mount_point = volumes
        .mount(&state.volume_path, &secret)
        .await
        .context("mount volume")?;
    tracing::info!(mount = %mount_point.display(), "volume mounted");
    Ok((mount_point, true))
}

/// Mount the encrypted volume without touching the container.
///
/// # Errors
///
/// Returns an error if the volume is missing, the mount fails, or no mount
/// is visible afterwards.
pub async fn unlock_volume(
    volumes: &impl VolumeBoundary,
    containers: &impl ContainerBoundary,
    links: &impl SymlinkManager,
    secrets: &impl SecretProvider,
    reporter: &impl ProgressReporter,
    session: &Session,
) -> Result<UnlockOutcome> {
    let target = detect_target(session);
    let before = detect(volumes, containers, links, target).await;
    let (_, mounted_now) = ensure_mounted(volumes, secrets, reporter, &before).await?;
    if !mounted_now {
        reporter.success("volume already unlocked");
        return Ok(UnlockOutcome::AlreadyUnlocked { state: before });
    }

    let state = detect(volumes, containers, links, target).await;
    if !state.volume_mounted {
        return Err(SessionError::VerificationFailed {
            step: "mount volume",
            expected: "volume mounted",
        }
        .into());
    }
    reporter.success(&format!("volume unlocked at {}", state.mount_point_display()));
    Ok(UnlockOutcome::Unlocked { state })
}

// ── lock ─────────────────────────────────────────────────────────────────────

pub struct LockOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub session: &'a Session,
    /// Wait applied after a container was stopped, before unmounting.
    pub release_delay: Duration,
}

/// Outcome of the `lock_volume` use-case.
#[derive(Debug)]
pub enum LockOutcome {
    /// Nothing was mounted.
    AlreadyLocked { halt: HaltOutcome },
    /// The volume was unmounted by this call.
    Locked { halt: HaltOutcome },
}

/// Stop the session container, then unmount the volume.
///
/// The container is always brought down first. If that fails the unmount is
/// never attempted.
///
/// # Errors
///
/// Returns the stop failure unchanged, or a boundary error from the unmount,
/// or a verification error if the mount is still visible.
pub async fn lock_volume(
    volumes: &impl VolumeBoundary,
    containers: &impl ContainerBoundary,
    links: &impl SymlinkManager,
    opts: LockOptions<'_, impl ProgressReporter>,
) -> Result<LockOutcome> {
    let LockOptions {
        reporter,
        session,
        release_delay,
    } = opts;
    let target = detect_target(session);
    let before = detect(volumes, containers, links, target).await;

    if before.container_running {
        reporter.step(&format!("stopping {}...", session.container_name));
    }
    let halt = halt_container(containers, &session.container_name, session.stop_grace)
        .await
        .context("stop container before unmount")?;
    if halt == HaltOutcome::Stopped && before.volume_mounted {
        tokio::time::sleep(release_delay).await;
    }

    let Some(mount_point) = before.mount_point() else {
        reporter.success("volume already locked");
        return Ok(LockOutcome::AlreadyLocked { halt });
    };

    reporter.step("locking encrypted volume...");
    volumes
        .unmount(mount_point)
        .await
        .context("unmount volume")?;

    let after = detect(volumes, containers, links, target).await;
    if after.volume_mounted {
        return Err(SessionError::VerificationFailed {
            step: "unmount volume",
            expected: "no capsule mount visible",
        }
        .into());
    }
    tracing::info!(mount = %mount_point.display(), "volume unmounted");
    reporter.success("volume locked");
    Ok(LockOutcome::Locked { halt })
}

fn detect_target(session: &Session) -> DetectTarget<'_> {
    DetectTarget {
        volume_path: &session.volume_path,
        container_name: &session.container_name,
        workspace: &session.workspace,
    }
}

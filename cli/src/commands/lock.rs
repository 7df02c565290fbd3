//! `capsule lock` — stop the container, then lock the volume.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::volume_lock::{
    LockOptions, LockOutcome, MOUNT_RELEASE_DELAY, lock_volume,
};
use crate::output::JsonRenderer;

/// Run `capsule lock`.
///
/// # Errors
///
/// Returns an error if the container cannot be stopped (the volume is then
/// left mounted) or the unmount fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let session = app.session().await?;
    let reporter = app.reporter();
    let outcome = lock_volume(
        &app.volumes,
        &app.containers,
        &app.links,
        LockOptions {
            reporter: &reporter,
            session: &session,
            release_delay: MOUNT_RELEASE_DELAY,
        },
    )
    .await?;

    if app.is_json() {
        let (halt, already_locked) = match outcome {
            LockOutcome::AlreadyLocked { halt } => (halt, true),
            LockOutcome::Locked { halt } => (halt, false),
        };
        JsonRenderer::render(&serde_json::json!({
            "volume_path": session.volume_path,
            "already_locked": already_locked,
            "halt": halt,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}

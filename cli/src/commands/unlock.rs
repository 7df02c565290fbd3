//! `capsule unlock` — mount the volume without starting a container.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::volume_lock::{UnlockOutcome, unlock_volume};
use crate::output::{JsonRenderer, OutputContext, TerminalReporter, porcelain};

/// Keys printed by `unlock --porcelain`.
pub const UNLOCK_KEYS: &[&str] = &["VOLUME_PATH", "MOUNT_POINT", "MOUNTED"];

/// Arguments for the unlock command.
#[derive(Args, Default)]
pub struct UnlockArgs {
    /// Print stable KEY=VALUE lines for scripts
    #[arg(long)]
    pub porcelain: bool,
}

/// Run `capsule unlock`.
///
/// # Errors
///
/// Returns an error if the volume is missing or cannot be mounted.
pub async fn run(app: &AppContext, args: &UnlockArgs) -> Result<ExitCode> {
    let session = app.session().await?;
    // Scripts read stdout; keep progress off it in porcelain mode.
    let silent = OutputContext::new(true, true);
    let reporter = if args.porcelain {
        TerminalReporter::new(&silent)
    } else {
        app.reporter()
    };
    let outcome = unlock_volume(
        &app.volumes,
        &app.containers,
        &app.links,
        &app.secrets,
        &reporter,
        &session,
    )
    .await?;

    let state = outcome.state();
    if args.porcelain {
        let pairs = state.report_pairs(&session.container_name);
        porcelain::print_pairs(&porcelain::select(&pairs, UNLOCK_KEYS));
    } else if app.is_json() {
        JsonRenderer::render(&serde_json::json!({
            "already_unlocked": matches!(outcome, UnlockOutcome::AlreadyUnlocked { .. }),
            "volume_path": state.volume_path,
            "mount_point": state.mount_point,
            "mounted": state.volume_mounted,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}

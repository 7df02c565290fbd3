//! `capsule status` — report volume, container and docs link state.
//!
//! Pure read; never changes anything.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::session_status::gather_status;
use crate::output::porcelain;

/// Arguments for the status command.
#[derive(Args, Default)]
pub struct StatusArgs {
    /// Print stable KEY=VALUE lines for scripts
    #[arg(long)]
    pub porcelain: bool,
}

/// Run `capsule status`.
///
/// # Errors
///
/// Returns an error if the session inputs cannot be resolved.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<ExitCode> {
    let session = app.session().await?;
    let report = gather_status(&app.volumes, &app.containers, &app.links, &session).await;

    if args.porcelain {
        porcelain::print_pairs(&report.state.report_pairs(&report.container));
    } else {
        app.renderer().render_status(&report)?;
    }
    Ok(ExitCode::SUCCESS)
}

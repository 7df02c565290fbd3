//! `capsule start` — bring the session to ready and open a shell.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::readiness::RetryPolicy;
use crate::application::services::session_start::{StartOptions, start_session};
use crate::output::JsonRenderer;

/// Arguments for the start command.
#[derive(Args, Default)]
pub struct StartArgs {
    /// Leave the container running without opening a shell
    #[arg(long, short)]
    pub detach: bool,
}

/// Run `capsule start`.
///
/// # Errors
///
/// Returns an error naming the step that failed.
pub async fn run(app: &AppContext, args: &StartArgs) -> Result<ExitCode> {
    let session = app.session().await?;
    let reporter = app.reporter();
    // JSON callers are scripts; never hand them a terminal.
    let attach = !args.detach && !app.is_json();

    let report = start_session(
        &app.volumes,
        &app.containers,
        &app.links,
        &app.secrets,
        StartOptions {
            reporter: &reporter,
            session: &session,
            retry: RetryPolicy::default(),
            attach,
        },
    )
    .await?;

    if app.is_json() {
        JsonRenderer::render(&serde_json::json!({
            "container": session.container_name,
            "mounted": report.mounted,
            "container_started": report.container_started,
            "already_ready": report.already_ready(),
            "link_target": report.link_target,
            "phase": report.state.phase(),
            "state": report.state,
        }))?;
    } else if args.detach {
        app.output.info(&format!(
            "attach with: docker exec -it {} {}",
            session.container_name, session.shell
        ));
    }
    Ok(ExitCode::SUCCESS)
}

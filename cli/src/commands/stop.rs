//! `capsule stop` — stop and remove the session container.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::session_stop::stop_session;
use crate::output::JsonRenderer;

/// Run `capsule stop`.
///
/// # Errors
///
/// Returns an error if the container cannot be stopped or removed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let session = app.session().await?;
    let reporter = app.reporter();
    let report =
        stop_session(&app.volumes, &app.containers, &app.links, &reporter, &session).await?;

    if app.is_json() {
        JsonRenderer::render(&serde_json::json!({
            "container": session.container_name,
            "halt": report.halt,
            "state": report.state,
        }))?;
    } else if report.state.volume_mounted {
        app.output.info("volume is still unlocked; lock it with: capsule lock");
    }
    Ok(ExitCode::SUCCESS)
}

//! `capsule init` — create the encrypted volume.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::volume_lock::create_volume;
use crate::output::JsonRenderer;

/// Arguments for the init command.
#[derive(Args, Default)]
pub struct InitArgs {
    /// Volume size in GB (defaults to `volume.size_gb`)
    #[arg(long, value_name = "GB")]
    pub size: Option<u32>,
}

/// Run `capsule init`.
///
/// # Errors
///
/// Returns an error if the size is out of range, a volume already exists, or
/// the volume tool fails.
pub async fn run(app: &AppContext, args: &InitArgs) -> Result<ExitCode> {
    let config = app.config()?;
    let workspace = app.workspace()?;
    let (path, _) = app.volume_path(&config, &workspace)?;
    let size_gb = args.size.unwrap_or(config.volume.size_gb);

    let reporter = app.reporter();
    let path = create_volume(&app.volumes, &app.secrets, &reporter, &path, size_gb).await?;

    if app.is_json() {
        JsonRenderer::render(&serde_json::json!({
            "volume_path": path,
            "size_gb": size_gb,
        }))?;
    } else {
        app.output.info("unlock it with: capsule unlock");
    }
    Ok(ExitCode::SUCCESS)
}

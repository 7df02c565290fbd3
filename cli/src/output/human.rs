//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::session_status::StatusReport;
use crate::domain::{CapsuleConfig, SessionPhase};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("capsule {version}");
    }

    /// Render the session snapshot.
    pub fn render_status(&self, report: &StatusReport) {
        let state = &report.state;
        self.ctx.kv("Project:  ", report.project.as_str());
        self.ctx.kv("Phase:    ", phase_display(report.phase));
        println!();

        self.ctx.header("Volume:");
        self.ctx.kv("  path:   ", &state.volume_path.display().to_string());
        if !state.volume_exists {
            self.ctx.warn("volume not found (create one with: capsule init)");
        } else if state.volume_mounted {
            self.ctx
                .success(&format!("unlocked at {}", state.mount_point_display()));
        } else {
            self.ctx.info("locked");
        }
        println!();

        self.ctx.header("Container:");
        self.ctx.kv("  name:   ", &report.container);
        if state.container_running {
            self.ctx.success("running");
        } else if state.container_exists {
            self.ctx.warn("stopped (the next start replaces it)");
        } else {
            self.ctx.info("not created");
        }
        println!();

        self.ctx.header("Docs link:");
        if state.symlink_healthy() {
            self.ctx.success("_docs linked");
        } else if state.symlink_broken {
            self.ctx.warn("_docs is broken (volume locked?)");
        } else {
            self.ctx.info("_docs not linked");
        }
    }

    /// Render the current configuration.
    pub fn render_config(&self, config: &CapsuleConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        println!("  {:<24} {}", "image:", config.image);
        println!(
            "  {:<24} {}",
            "volume.path:",
            config
                .volume
                .path
                .as_deref()
                .map_or_else(|| "(auto)".to_string(), |p| p.display().to_string())
        );
        println!("  {:<24} {}", "volume.size_gb:", config.volume.size_gb);
        println!("  {:<24} {}", "container.shell:", config.container.shell);
        println!(
            "  {:<24} {}",
            "container.stop_timeout:", config.container.stop_timeout
        );
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in ["CAPSULE_CONFIG", "CAPSULE_VOLUME", "CAPSULE_LOG", "NO_COLOR"] {
            println!(
                "    {:<18} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
    }
}

/// Convert a session phase to a display string.
#[must_use]
pub fn phase_display(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Locked => "locked",
        SessionPhase::Mounted => "unlocked, no container",
        SessionPhase::ContainerUp => "container running, docs not linked",
        SessionPhase::Ready => "ready",
    }
}

//! Application context — unified state passed to every command handler.
//!
//! `AppContext` owns the output context, the production adapters and the
//! flags that every command shares. Command handlers receive `&AppContext`
//! and pull the adapters they need from it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::services::{config_service, project::resolve_project};
use crate::domain::volume::{VOLUME_FILE, resolve_volume_path};
use crate::domain::{CapsuleConfig, Session, VolumeSource};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{YamlConfigStore, capsule_home};
use crate::infra::docker::DockerCli;
use crate::infra::git::GitRemote;
use crate::infra::secret::{SecretSource, TerminalSecrets};
use crate::infra::symlink::FsSymlinkManager;
use crate::infra::volume::HostVolumes;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Where this invocation operates.
#[derive(Default)]
pub struct SessionFlags {
    /// Workspace directory; the current directory when `None`.
    pub workspace: Option<PathBuf>,
    /// Explicit volume path (`--volume` / `CAPSULE_VOLUME`).
    pub volume: Option<PathBuf>,
    /// Where the volume password comes from.
    pub secret_source: Option<SecretSource>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Session resolution options.
    pub session: SessionFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Configuration persistence.
    pub config_store: YamlConfigStore,
    /// Container runtime adapter.
    pub containers: DockerCli<TokioCommandRunner>,
    /// Encrypted volume adapter for this host.
    pub volumes: HostVolumes,
    /// Workspace docs link adapter.
    pub links: FsSymlinkManager,
    /// Volume password source.
    pub secrets: TerminalSecrets,
    remotes: GitRemote<TokioCommandRunner>,
    workspace: Option<PathBuf>,
    volume: Option<PathBuf>,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // Progress lines would corrupt JSON on stdout.
        let quiet = flags.output.quiet || flags.output.json;

        let workspace = match flags.session.workspace {
            Some(path) => Some(absolute(&path)?),
            None => None,
        };
        let volume = match flags.session.volume {
            Some(path) => Some(absolute(&path)?),
            None => None,
        };

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            config_store: YamlConfigStore::from_env(),
            containers: DockerCli::default_runner(),
            volumes: HostVolumes::default_runner(),
            links: FsSymlinkManager,
            secrets: TerminalSecrets::new(
                flags.session.secret_source.unwrap_or(SecretSource::Prompt),
            ),
            remotes: GitRemote::default_runner(),
            workspace,
            volume,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter bound to this context's output.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Load the configuration file (defaults when absent).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn config(&self) -> Result<CapsuleConfig> {
        config_service::load_config(&self.config_store)
    }

    /// Absolute workspace path for this invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read.
    pub fn workspace(&self) -> Result<PathBuf> {
        match &self.workspace {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().context("cannot read current directory"),
        }
    }

    /// Resolve the volume path from flags, config and the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn volume_path(
        &self,
        config: &CapsuleConfig,
        workspace: &Path,
    ) -> Result<(PathBuf, VolumeSource)> {
        let explicit = self.volume.as_deref().or(config.volume.path.as_deref());
        let local = workspace.join(VOLUME_FILE);
        let global = capsule_home()?.join(VOLUME_FILE);
        Ok(resolve_volume_path(explicit, &local, &global, Path::is_file))
    }

    /// Resolve every input of a session command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the workspace is
    /// not an absolute path.
    pub async fn session(&self) -> Result<Session> {
        let config = self.config()?;
        let workspace = self.workspace()?;
        let project = resolve_project(&self.remotes, &workspace).await?;
        let (volume_path, volume_source) = self.volume_path(&config, &workspace)?;
        tracing::debug!(
            volume = %volume_path.display(),
            source = ?volume_source,
            "resolved volume path",
        );
        Ok(Session {
            container_name: project.container_name(),
            project,
            workspace,
            volume_path,
            volume_source,
            image: config.image,
            shell: config.container.shell,
            stop_grace: Duration::from_secs(config.container.stop_timeout),
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("cannot resolve {}", path.display()))
}

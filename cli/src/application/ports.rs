//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use secrecy::SecretString;

use crate::domain::{CapsuleConfig, ContainerConfig, LinkStatus, ProjectIdentity};

// ── Volume Boundary ───────────────────────────────────────────────────────────

/// Encrypted volume operations: create, mount, unmount, inspect.
#[allow(async_fn_in_trait)]
pub trait VolumeBoundary {
    /// `true` when the backing file exists at `path`.
    fn exists(&self, path: &Path) -> bool;
    /// Scan for an active mount carrying this tool's naming prefix.
    ///
    /// The scan is not scoped to a particular volume: any matching mount
    /// counts.
    fn find_mount_point(&self) -> Option<PathBuf>;
    /// Mount the volume at `path`, returning the live mount point.
    async fn mount(&self, path: &Path, secret: &SecretString) -> Result<PathBuf>;
    /// Unmount the volume mounted at `mount_point`.
    async fn unmount(&self, mount_point: &Path) -> Result<()>;
    /// Create a new encrypted volume of `size_gb` at `path`.
    async fn create(&self, path: &Path, size_gb: u32, secret: &SecretString) -> Result<()>;
}

// ── Container Boundary ────────────────────────────────────────────────────────

/// Sandboxed container operations.
#[allow(async_fn_in_trait)]
pub trait ContainerBoundary {
    /// Fail when the container runtime cannot be reached.
    async fn daemon_available(&self) -> Result<()>;
    /// `true` when `image` is present locally.
    async fn image_exists(&self, image: &str) -> bool;
    /// `true` when a container named exactly `name` exists, running or not.
    async fn exists(&self, name: &str) -> bool;
    /// `true` when the container named `name` is running.
    async fn running(&self, name: &str) -> bool;
    /// Create and start a detached container.
    async fn run(&self, config: &ContainerConfig) -> Result<()>;
    /// Ask the container to stop, waiting up to `grace`.
    async fn stop(&self, name: &str, grace: Duration) -> Result<()>;
    /// Force-terminate the container.
    async fn kill(&self, name: &str) -> Result<()>;
    /// Remove the container record.
    async fn remove(&self, name: &str) -> Result<()>;
    /// Attach the caller's terminal to `shell` inside the container and
    /// return when the session ends.
    async fn exec_interactive(&self, name: &str, shell: &str) -> Result<()>;
}

// ── Symlink Manager ───────────────────────────────────────────────────────────

/// Workspace-to-volume docs link.
pub trait SymlinkManager {
    /// Point `<workspace>/_docs` at `<mount_point>/repos/<project>`, creating
    /// the target directory if needed. Returns the link target.
    fn link(&self, workspace: &Path, mount_point: &Path, project: &ProjectIdentity)
    -> Result<PathBuf>;
    /// Inspect `<workspace>/_docs` without following it.
    fn inspect(&self, workspace: &Path) -> LinkStatus;
}

// ── Secret Provider ───────────────────────────────────────────────────────────

/// Supplies the volume password. The source (prompt, env var, stdin) is
/// chosen by the caller and opaque to services.
pub trait SecretProvider {
    /// Obtain the secret. `confirm` asks interactive sources to read it twice.
    fn secret(&self, prompt: &str, confirm: bool) -> Result<SecretString>;
}

// ── Project Source ────────────────────────────────────────────────────────────

/// Looks up the version-control remote of a workspace.
#[allow(async_fn_in_trait)]
pub trait RemoteResolver {
    /// Remote URL of `workspace`, or `None` when it has none.
    async fn remote_url(&self, workspace: &Path) -> Option<String>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned) and
    /// the error must be a `BoundaryError::Timeout`.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
    /// Run a program with inherited stdio and no deadline; return its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults when no file exists.
    fn load(&self) -> Result<CapsuleConfig>;
    /// Persist the configuration.
    fn save(&self, config: &CapsuleConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

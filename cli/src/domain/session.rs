//! The resolved inputs of one invocation: which workspace, which project,
//! which container, which volume.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::identity::ProjectIdentity;
use crate::domain::volume::VolumeSource;

/// Name of the workspace link into the encrypted volume.
pub const DOCS_LINK_NAME: &str = "_docs";

/// Directory under the mount point holding one subdirectory per project.
pub const REPOS_DIR: &str = "repos";

/// Session inputs, resolved fresh for every command and never stored.
#[derive(Debug, Clone)]
pub struct Session {
    /// Absolute workspace path.
    pub workspace: PathBuf,
    /// Identity derived from the remote URL or the workspace path.
    pub project: ProjectIdentity,
    /// Container name derived from `project`.
    pub container_name: String,
    /// Encrypted volume backing file.
    pub volume_path: PathBuf,
    /// How `volume_path` was chosen.
    pub volume_source: VolumeSource,
    /// Container image to run.
    pub image: String,
    /// Shell used for the interactive session.
    pub shell: String,
    /// Grace period for `stop` before force-terminating.
    pub stop_grace: Duration,
}

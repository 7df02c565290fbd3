//! Application service — session status gathering use-case.
//!
//! Pure read. Never mutates any resource.

use std::path::PathBuf;

use serde::Serialize;

use crate::application::ports::{ContainerBoundary, SymlinkManager, VolumeBoundary};
use crate::application::services::detect::{DetectTarget, detect};
use crate::domain::{EnvironmentState, ProjectIdentity, Session, SessionPhase, VolumeSource};

/// Everything `capsule status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub project: ProjectIdentity,
    pub container: String,
    pub workspace: PathBuf,
    pub volume_source: VolumeSource,
    pub phase: SessionPhase,
    #[serde(flatten)]
    pub state: EnvironmentState,
}

/// Gather status for `session`.
///
/// Infallible: boundary failures show up as `false` fields in the snapshot.
pub async fn gather_status(
    volumes: &impl VolumeBoundary,
    containers: &impl ContainerBoundary,
    links: &impl SymlinkManager,
    session: &Session,
) -> StatusReport {
    let state = detect(
        volumes,
        containers,
        links,
        DetectTarget {
            volume_path: &session.volume_path,
            container_name: &session.container_name,
            workspace: &session.workspace,
        },
    )
    .await;
    StatusReport {
        project: session.project.clone(),
        container: session.container_name.clone(),
        workspace: session.workspace.clone(),
        volume_source: session.volume_source,
        phase: state.phase(),
        state,
    }
}

//! Application service — state detection.
//!
//! Composes point-in-time queries against the volume, the container runtime
//! and the workspace link into one [`EnvironmentState`]. Holds no state between
//! calls and performs no mutations, so it is safe to call repeatedly.

use std::path::Path;

use crate::application::ports::{ContainerBoundary, SymlinkManager, VolumeBoundary};
use crate::domain::{EnvironmentState, Observations};

/// What to inspect.
#[derive(Debug, Clone, Copy)]
pub struct DetectTarget<'a> {
    /// Resolved encrypted volume path.
    pub volume_path: &'a Path,
    /// Exact container name.
    pub container_name: &'a str,
    /// Workspace holding the docs link.
    pub workspace: &'a Path,
}

/// Take a snapshot of the live environment.
pub async fn detect(
    volumes: &impl VolumeBoundary,
    containers: &impl ContainerBoundary,
    links: &impl SymlinkManager,
    target: DetectTarget<'_>,
) -> EnvironmentState {
    let volume_exists = volumes.exists(target.volume_path);
    let mount_point = volumes.find_mount_point();
    if mount_point.is_some() && !volume_exists {
        tracing::warn!(
            volume = %target.volume_path.display(),
            mount = ?mount_point,
            "a capsule mount is active but the resolved volume file is missing",
        );
    }

    let container_exists = containers.exists(target.container_name).await;
    // "running" is only meaningful for a container that exists.
    let container_running = container_exists && containers.running(target.container_name).await;

    let link = links.inspect(target.workspace);

    let state = EnvironmentState::from_observations(Observations {
        volume_path: target.volume_path.to_path_buf(),
        volume_exists,
        mount_point,
        container_exists,
        container_running,
        link,
    });
    tracing::debug!(?state, "detected environment");
    state
}

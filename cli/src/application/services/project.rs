//! Project identity resolution for a workspace.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::RemoteResolver;
use crate::domain::ProjectIdentity;
use crate::domain::container::validate_absolute_path;

/// Derive the identity of the project checked out at `workspace`.
///
/// Uses the version-control remote when one is configured, else the absolute
/// workspace path.
///
/// # Errors
///
/// Returns a precondition error if `workspace` is not absolute.
pub async fn resolve_project(
    remotes: &impl RemoteResolver,
    workspace: &Path,
) -> Result<ProjectIdentity> {
    validate_absolute_path(workspace, "workspace")?;
    let remote = remotes.remote_url(workspace).await;
    let project = ProjectIdentity::derive(remote.as_deref(), workspace);
    tracing::debug!(
        workspace = %workspace.display(),
        has_remote = remote.is_some(),
        %project,
        "resolved project identity",
    );
    Ok(project)
}

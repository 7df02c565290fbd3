//! Filesystem implementation of the `SymlinkManager` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::SymlinkManager;
use crate::domain::container::validate_absolute_path;
use crate::domain::session::{DOCS_LINK_NAME, REPOS_DIR};
use crate::domain::{LinkStatus, ProjectIdentity, SessionError};

/// Suffix of the temporary link renamed onto `_docs`.
const TEMP_SUFFIX: &str = ".tmp";

/// Production `SymlinkManager` using Unix symlinks on the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSymlinkManager;

/// `<workspace>/_docs`.
#[must_use]
pub fn docs_link_path(workspace: &Path) -> PathBuf {
    workspace.join(DOCS_LINK_NAME)
}

/// `<mount_point>/repos/<project>`.
#[must_use]
pub fn docs_target(mount_point: &Path, project: &ProjectIdentity) -> PathBuf {
    mount_point.join(REPOS_DIR).join(project.as_str())
}

impl SymlinkManager for FsSymlinkManager {
    fn link(
        &self,
        workspace: &Path,
        mount_point: &Path,
        project: &ProjectIdentity,
    ) -> Result<PathBuf> {
        validate_absolute_path(workspace, "workspace")?;
        validate_absolute_path(mount_point, "volume mount point")?;

        let link_path = docs_link_path(workspace);
        if let Ok(meta) = std::fs::symlink_metadata(&link_path) {
            if !meta.file_type().is_symlink() {
                tracing::warn!(path = %link_path.display(), "docs path is not a symlink, leaving it alone");
                return Err(SessionError::LinkPathOccupied(link_path).into());
            }
        }

        let target = docs_target(mount_point, project);
        create_target_dir(&target)
            .with_context(|| format!("cannot create {}", target.display()))?;

        let mut temp_name = DOCS_LINK_NAME.to_string();
        temp_name.push_str(TEMP_SUFFIX);
        let temp_path = workspace.join(temp_name);

        // Stale link from an interrupted attempt.
        let _ = std::fs::remove_file(&temp_path);

        symlink(&target, &temp_path)
            .with_context(|| format!("cannot create symlink {}", temp_path.display()))?;

        // rename(2) within one directory replaces the old link atomically.
        if let Err(e) = std::fs::rename(&temp_path, &link_path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("cannot rename symlink onto {}", link_path.display()));
        }
        tracing::debug!(link = %link_path.display(), target = %target.display(), "docs link in place");
        Ok(target)
    }

    fn inspect(&self, workspace: &Path) -> LinkStatus {
        let link_path = docs_link_path(workspace);
        match std::fs::symlink_metadata(&link_path) {
            Ok(meta) if meta.file_type().is_symlink() => LinkStatus {
                exists: true,
                broken: std::fs::metadata(&link_path).is_err(),
            },
            Ok(_) => {
                tracing::warn!(path = %link_path.display(), "docs path exists but is not a symlink");
                LinkStatus::default()
            }
            Err(_) => LinkStatus::default(),
        }
    }
}

#[cfg(unix)]
fn create_target_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(path)
}

#[cfg(not(unix))]
fn create_target_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

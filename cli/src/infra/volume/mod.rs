//! Infrastructure implementations of the `VolumeBoundary` port.
//!
//! macOS uses `hdiutil` encrypted sparse images mounted under `/Volumes`;
//! Linux uses LUKS containers mounted under `/tmp`. Both share the mount
//! scan below, which is global to the machine: any directory carrying the
//! reserved prefix counts, whichever volume backs it.

pub mod hdiutil;
pub mod luks;

use std::path::{Path, PathBuf};

use crate::domain::MountLayout;

pub use hdiutil::HdiutilVolumes;
pub use luks::LuksVolumes;

/// Volume adapter for the current host.
#[cfg(target_os = "macos")]
pub type HostVolumes = HdiutilVolumes<crate::infra::command_runner::TokioCommandRunner>;
#[cfg(not(target_os = "macos"))]
pub type HostVolumes = LuksVolumes<crate::infra::command_runner::TokioCommandRunner>;

/// Candidate mount points under `layout.root`, sorted by name.
#[must_use]
pub fn scan_mount_points(layout: &MountLayout) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(&layout.root) else {
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| layout.matches(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter(|p| !layout.require_mount || is_mount_point(p))
        .collect();
    found.sort();
    found
}

/// First candidate mount point, warning when the choice is ambiguous.
#[must_use]
pub fn first_mount_point(layout: &MountLayout) -> Option<PathBuf> {
    let mut found = scan_mount_points(layout);
    if found.len() > 1 {
        tracing::warn!(
            candidates = ?found,
            "several capsule mounts are active; using the first one",
        );
    }
    if found.is_empty() {
        None
    } else {
        Some(found.swap_remove(0))
    }
}

/// `true` when `path` sits on a different device than its parent.
#[cfg(unix)]
#[must_use]
pub fn is_mount_point(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    let Some(parent) = path.parent() else {
        return false;
    };
    match (std::fs::metadata(path), std::fs::metadata(parent)) {
        (Ok(own), Ok(up)) => own.dev() != up.dev(),
        _ => false,
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_mount_point(path: &Path) -> bool {
    path.is_dir()
}

/// Create the parent directory of a new volume file.
pub(crate) fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    Ok(())
}

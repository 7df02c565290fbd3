//! Encrypted volume naming, sizing and path resolution.
//!
//! Pure functions only. Filesystem existence checks are injected as closures so
//! the search order can be tested without touching disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::error::PreconditionError;
use crate::domain::identity;

/// Smallest volume `capsule init` will create.
pub const MIN_VOLUME_SIZE_GB: u32 = 1;

/// Largest volume `capsule init` will create.
pub const MAX_VOLUME_SIZE_GB: u32 = 100;

/// Volume label used when the volume tool asks for one.
pub const VOLUME_LABEL: &str = "Capsule";

/// Backing file name of the encrypted volume on this host.
#[cfg(target_os = "macos")]
pub const VOLUME_FILE: &str = "capsule-env.sparseimage";
#[cfg(not(target_os = "macos"))]
pub const VOLUME_FILE: &str = "capsule-env.img";

/// Check a requested volume size against the allowed range.
///
/// # Errors
///
/// Returns [`PreconditionError::VolumeSizeOutOfRange`] outside
/// `MIN_VOLUME_SIZE_GB..=MAX_VOLUME_SIZE_GB`.
pub fn validate_volume_size(size_gb: u32) -> Result<(), PreconditionError> {
    if !(MIN_VOLUME_SIZE_GB..=MAX_VOLUME_SIZE_GB).contains(&size_gb) {
        return Err(PreconditionError::VolumeSizeOutOfRange {
            size: size_gb,
            min: MIN_VOLUME_SIZE_GB,
            max: MAX_VOLUME_SIZE_GB,
        });
    }
    Ok(())
}

/// Where the volume path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSource {
    /// `--volume`, `CAPSULE_VOLUME`, or `volume.path` in the config file.
    Explicit,
    /// A volume file next to the workspace.
    Local,
    /// The per-user default under `~/.capsule`.
    Global,
}

/// Resolve the volume path: explicit override, then a local candidate that
/// exists, then the global default.
#[must_use]
pub fn resolve_volume_path(
    explicit: Option<&Path>,
    local_candidate: &Path,
    global_default: &Path,
    exists: impl Fn(&Path) -> bool,
) -> (PathBuf, VolumeSource) {
    if let Some(path) = explicit {
        return (path.to_path_buf(), VolumeSource::Explicit);
    }
    if exists(local_candidate) {
        return (local_candidate.to_path_buf(), VolumeSource::Local);
    }
    (global_default.to_path_buf(), VolumeSource::Global)
}

/// Where this tool mounts volumes and how it names the mount directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountLayout {
    /// Directory that holds mount points, e.g. `/Volumes`.
    pub root: PathBuf,
    /// Reserved name prefix, e.g. `Capsule-`.
    pub prefix: String,
    /// Only count directories that sit on a different device than `root`.
    pub require_mount: bool,
}

impl MountLayout {
    /// Layout used on the current host.
    #[must_use]
    pub fn for_host() -> Self {
        #[cfg(target_os = "macos")]
        return Self {
            root: PathBuf::from("/Volumes"),
            prefix: "Capsule-".to_string(),
            require_mount: false,
        };
        #[cfg(not(target_os = "macos"))]
        Self {
            root: PathBuf::from("/tmp"),
            prefix: "capsule-mount-".to_string(),
            require_mount: true,
        }
    }

    /// Mount point this tool uses for `volume`: `<root>/<prefix><label>`.
    ///
    /// The label is the sanitized file stem, so two differently-named volumes
    /// never share a mount directory.
    #[must_use]
    pub fn mount_point_for(&self, volume: &Path) -> PathBuf {
        let stem = volume
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = identity::normalize(&stem);
        self.root.join(format!("{}{label}", self.prefix))
    }

    /// `true` when `name` carries this tool's reserved prefix.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && name.len() > self.prefix.len()
    }
}

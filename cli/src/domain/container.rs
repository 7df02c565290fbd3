//! Container configuration and name validation.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::PreconditionError;

/// Maximum container name length accepted by the runtime.
pub const MAX_CONTAINER_NAME_LEN: usize = 128;

/// Maximum image reference length.
pub const MAX_IMAGE_REF_LEN: usize = 255;

/// Where the encrypted volume is bind-mounted inside the container.
pub const VOLUME_TARGET: &str = "/capsule-env";

/// Where the project workspace is bind-mounted inside the container.
pub const WORKSPACE_TARGET: &str = "/workspace";

/// `HOME` inside the container, so credentials persist in the encrypted volume.
pub const CONTAINER_HOME: &str = "/capsule-env/home";

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static CONTAINER_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"));

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static IMAGE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:/@-]*$").expect("valid regex"));

/// Validate a container name.
///
/// # Errors
///
/// Returns an error if the name is empty, too long, or uses characters the
/// container runtime rejects.
pub fn validate_container_name(name: &str) -> Result<(), PreconditionError> {
    let invalid = |reason| PreconditionError::InvalidContainerName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(PreconditionError::Empty {
            field: "container name",
        });
    }
    if name.len() > MAX_CONTAINER_NAME_LEN {
        return Err(invalid("longer than 128 characters"));
    }
    if !CONTAINER_NAME_RE.is_match(name) {
        return Err(invalid(
            "must start with a letter or digit and contain only [A-Za-z0-9_.-]",
        ));
    }
    Ok(())
}

/// Validate an image reference such as `capsule:latest` or
/// `ghcr.io/org/capsule:1.2`.
///
/// # Errors
///
/// Returns an error if the reference is empty, too long, has an empty tag, or
/// contains characters outside the reference grammar.
pub fn validate_image_ref(image: &str) -> Result<(), PreconditionError> {
    let invalid = |reason| PreconditionError::InvalidImage {
        image: image.to_string(),
        reason,
    };
    if image.is_empty() {
        return Err(PreconditionError::Empty { field: "image" });
    }
    if image.len() > MAX_IMAGE_REF_LEN {
        return Err(invalid("longer than 255 characters"));
    }
    if !IMAGE_REF_RE.is_match(image) {
        return Err(invalid("contains characters outside [A-Za-z0-9_.:/@-]"));
    }
    if image.ends_with([':', '/', '@']) || image.contains("//") {
        return Err(invalid("empty name component or tag"));
    }
    Ok(())
}

/// Require an absolute path.
///
/// # Errors
///
/// Returns an error if `path` is empty or relative.
pub fn validate_absolute_path(path: &Path, field: &'static str) -> Result<(), PreconditionError> {
    if path.as_os_str().is_empty() {
        return Err(PreconditionError::Empty { field });
    }
    if !path.is_absolute() {
        return Err(PreconditionError::RelativePath {
            field,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Everything the container runtime needs to start a session container.
///
/// Only constructible through [`ContainerConfig::new`], which validates every
/// field; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    image: String,
    name: String,
    volume_mount_point: PathBuf,
    workspace: PathBuf,
}

impl ContainerConfig {
    /// Build and validate a container configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`PreconditionError`] for an invalid image or container name,
    /// or a relative mount point / workspace path.
    pub fn new(
        image: &str,
        name: &str,
        volume_mount_point: &Path,
        workspace: &Path,
    ) -> Result<Self, PreconditionError> {
        validate_image_ref(image)?;
        validate_container_name(name)?;
        validate_absolute_path(volume_mount_point, "volume mount point")?;
        validate_absolute_path(workspace, "workspace path")?;
        Ok(Self {
            image: image.to_string(),
            name: name.to_string(),
            volume_mount_point: volume_mount_point.to_path_buf(),
            workspace: workspace.to_path_buf(),
        })
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn volume_mount_point(&self) -> &Path {
        &self.volume_mount_point
    }

    #[must_use]
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

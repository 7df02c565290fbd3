//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

// ── Precondition errors ───────────────────────────────────────────────────────

/// Inputs rejected before any boundary call is made.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid container name '{name}': {reason}")]
    InvalidContainerName { name: String, reason: &'static str },

    #[error("invalid image reference '{image}': {reason}")]
    InvalidImage { image: String, reason: &'static str },

    #[error("{field} must be an absolute path, got '{}'", .path.display())]
    RelativePath { field: &'static str, path: PathBuf },

    #[error("volume size {size} GB is outside the allowed range {min}-{max} GB")]
    VolumeSizeOutOfRange { size: u32, min: u32, max: u32 },

    #[error("no encrypted volume at {}. Create one with: capsule init", .0.display())]
    VolumeMissing(PathBuf),

    #[error("an encrypted volume already exists at {}", .0.display())]
    VolumeAlreadyExists(PathBuf),
}

// ── Boundary errors ───────────────────────────────────────────────────────────

/// Failures reported by an external tool (volume tool, container runtime, git).
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The tool ran and exited non-zero. `detail` is the tool's raw stderr.
    #[error("{step} failed: {detail}")]
    Failed { step: String, detail: String },

    /// The tool did not finish before its deadline and was killed.
    #[error("{step} timed out after {}s", .after.as_secs())]
    Timeout { step: String, after: Duration },

    #[error("container runtime is not reachable: {0}")]
    DaemonUnavailable(String),

    #[error("image '{0}' not found. Build it with: docker build -t {0} .")]
    ImageNotFound(String),
}

// ── Session errors ────────────────────────────────────────────────────────────

/// Reconciliation failures that are not a single boundary call.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("container {name} not running after {attempts} attempts")]
    ContainerNotReady { name: String, attempts: u32 },

    #[error("failed to stop container {name}: stop error: {stop}, kill error: {kill}")]
    StopFailed {
        name: String,
        stop: String,
        kill: String,
    },

    #[error("{step} did not take effect: {expected}")]
    VerificationFailed {
        step: &'static str,
        expected: &'static str,
    },

    #[error(
        "{} exists and is not a symlink; move it aside so capsule can link the volume",
        .0.display()
    )]
    LinkPathOccupied(PathBuf),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{hint}")]
    InvalidValue {
        key: String,
        value: String,
        hint: String,
    },
}

/// Returns `true` when the root cause of `err` is a boundary timeout.
#[must_use]
pub fn is_timeout(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<BoundaryError>(),
            Some(BoundaryError::Timeout { .. })
        )
    })
}

/// Stable machine-readable code for the root cause of `err`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<BoundaryError>() {
            return match e {
                BoundaryError::Timeout { .. } => "TIMEOUT",
                BoundaryError::DaemonUnavailable(_) => "DAEMON_UNAVAILABLE",
                BoundaryError::ImageNotFound(_) => "IMAGE_NOT_FOUND",
                BoundaryError::Failed { .. } => "BOUNDARY_FAILED",
            };
        }
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return match e {
                SessionError::ContainerNotReady { .. } => "CONTAINER_NOT_READY",
                SessionError::StopFailed { .. } => "STOP_FAILED",
                SessionError::VerificationFailed { .. } => "VERIFICATION_FAILED",
                SessionError::LinkPathOccupied(_) => "LINK_PATH_OCCUPIED",
            };
        }
        if let Some(e) = cause.downcast_ref::<PreconditionError>() {
            return match e {
                PreconditionError::VolumeMissing(_) => "VOLUME_MISSING",
                PreconditionError::VolumeAlreadyExists(_) => "VOLUME_EXISTS",
                _ => "INVALID_INPUT",
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "INVALID_CONFIG";
        }
    }
    "ERROR"
}

//! Domain types and validators for Capsule configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::container::{validate_absolute_path, validate_image_ref};
use crate::domain::error::ConfigError;
use crate::domain::volume::{MAX_VOLUME_SIZE_GB, MIN_VOLUME_SIZE_GB, validate_volume_size};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "image",
    "volume.path",
    "volume.size_gb",
    "container.shell",
    "container.stop_timeout",
];

pub const MAX_STOP_TIMEOUT_SECS: u64 = 300;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.capsule/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleConfig {
    /// Container image for session containers.
    pub image: String,
    /// Encrypted volume settings.
    pub volume: VolumeConfig,
    /// Session container settings.
    pub container: ContainerSettings,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        Self {
            image: "capsule:latest".to_string(),
            volume: VolumeConfig::default(),
            container: ContainerSettings::default(),
        }
    }
}

/// Volume configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Explicit volume path; skips the local/global search when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Default size for `capsule init`.
    pub size_gb: u32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            path: None,
            size_gb: 10,
        }
    }
}

/// Container configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Shell started by the interactive session.
    pub shell: String,
    /// Seconds to wait for a graceful stop before killing.
    pub stop_timeout: u64,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".to_string(),
            stop_timeout: 10,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |hint: String| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            hint,
        }
        .into()
    };
    match key {
        "image" => validate_image_ref(value).map_err(|e| invalid(e.to_string())),
        "volume.path" => validate_absolute_path(std::path::Path::new(value), "volume.path")
            .map_err(|e| invalid(e.to_string())),
        "volume.size_gb" => {
            let size: u32 = value.parse().map_err(|_| {
                invalid(format!(
                    "Expected a whole number of GB ({MIN_VOLUME_SIZE_GB}-{MAX_VOLUME_SIZE_GB})"
                ))
            })?;
            validate_volume_size(size).map_err(|e| invalid(e.to_string()))
        }
        "container.shell" => {
            if value.starts_with('/') && !value.contains(char::is_whitespace) {
                Ok(())
            } else {
                Err(invalid("Expected an absolute path to a shell".to_string()))
            }
        }
        "container.stop_timeout" => match value.parse::<u64>() {
            Ok(secs) if (1..=MAX_STOP_TIMEOUT_SECS).contains(&secs) => Ok(()),
            _ => Err(invalid(format!(
                "Expected seconds between 1 and {MAX_STOP_TIMEOUT_SECS}"
            ))),
        },
        _ => validate_config_key(key),
    }
}

/// Validate and store `value` under `key`.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value invalid.
pub fn apply_config_value(config: &mut CapsuleConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    match key {
        "image" => config.image = value.to_string(),
        "volume.path" => config.volume.path = Some(PathBuf::from(value)),
        "volume.size_gb" => config.volume.size_gb = value.parse()?,
        "container.shell" => config.container.shell = value.to_string(),
        "container.stop_timeout" => config.container.stop_timeout = value.parse()?,
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────

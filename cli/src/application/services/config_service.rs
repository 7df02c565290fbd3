//! Application service — configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{CapsuleConfig, apply_config_value};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<CapsuleConfig> {
    store.load()
}

/// Save configuration.
///
/// # Errors
///
/// Returns an error if the config file cannot be written.
pub fn save_config(store: &impl ConfigStore, config: &CapsuleConfig) -> Result<()> {
    store.save(config)
}

/// Validate, apply and persist a single `key = value` setting.
///
/// Nothing is written when validation fails.
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, or I/O failures.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<CapsuleConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}

//! Application service — configuration use-cases.

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::config::DeployConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<DeployConfig> {
    store.load()
}

/// Set `key` to `value` and persist the result.
///
/// The stored file is only rewritten when the new value validates.
///
/// # Errors
///
/// Returns an error if the key is unknown, the value is invalid, or the file
/// cannot be written.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<DeployConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config).context("saving configuration")?;
    Ok(config)
}

//! Configuration file loading and parsing.

use std::path::Path;

use super::model::AppConfig;
use crate::error::ConfigError;

/// Loads the configuration file from disk and parses it.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: AppConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(config)
}

/// Loads the configuration file and applies semantic validation.
pub fn load_and_validate(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = load_from_path(path)?;
    config.validate()?;
    Ok(config)
}

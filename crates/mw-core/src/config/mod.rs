//! Configuration management for Massa Warden

mod warden;
pub mod serde_utils;

pub use warden::{BackoffConfig, InstallConfig, StartupConfig, WardenConfig};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("massa-warden")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load and validate a warden configuration file
pub fn load_warden_config(path: &Path) -> Result<WardenConfig, ConfigError> {
    let config: WardenConfig = load_config(path)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration at `path`, or the default location when `None`.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<WardenConfig, ConfigError> {
    match path {
        Some(path) => load_warden_config(path),
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                load_warden_config(&default_path)
            } else {
                tracing::debug!("No config at {:?}, using defaults", default_path);
                Ok(WardenConfig::default())
            }
        }
    }
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

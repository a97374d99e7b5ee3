//! Configuration file loader.

use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected shape.
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Returns the default path for the configuration file.
///
/// This is `~/.config/billsplit/config.toml` on Unix systems.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billsplit")
        .join("config.toml")
}

/// Load configuration from the given path, or from the default location when
/// `None`.
///
/// A missing file yields the default configuration; a present but malformed
/// file is an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = path.map_or_else(default_config_path, Path::to_path_buf);

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
}

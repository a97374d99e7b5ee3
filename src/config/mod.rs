//! Configuration module.

mod loader;
mod types;

pub use loader::{default_config_path, load_config, ConfigError};
pub use types::{AppConfig, AuditSettings, ServerSettings};

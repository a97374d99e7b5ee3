//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audit::RetryPolicy;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Audit trail settings.
    pub audit: AuditSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: true,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Audit trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Database path; the per-user data directory is used when unset.
    pub db_path: Option<PathBuf>,
    /// Total write attempts before giving up.
    pub retry_max_attempts: u32,
    /// Base backoff between write attempts, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Bound on the number of cached per-operation average durations.
    pub cache_capacity: usize,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            db_path: None,
            retry_max_attempts: 3,
            retry_backoff_ms: 50,
            cache_capacity: crate::audit::DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AuditSettings {
    /// The retry policy these settings describe.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_settings_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8080);
        assert!(settings.cors_permissive);
    }

    #[test]
    fn test_audit_settings_defaults() {
        let settings = AuditSettings::default();
        assert!(settings.db_path.is_none());
        assert_eq!(settings.retry_max_attempts, 3);
        assert_eq!(settings.retry_backoff_ms, 50);
        assert_eq!(settings.cache_capacity, 64);
    }

    #[test]
    fn test_retry_policy_conversion() {
        let settings = AuditSettings {
            retry_max_attempts: 5,
            retry_backoff_ms: 200,
            ..AuditSettings::default()
        };
        let policy = settings.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(200));
    }

    #[test]
    fn test_app_config_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 3000
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.audit.retry_max_attempts, 3);
    }

    #[test]
    fn test_app_config_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            cors_permissive = false

            [audit]
            db_path = "/var/lib/billsplit/audit.db"
            retry_max_attempts = 1
            retry_backoff_ms = 10
            cache_capacity = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.server.cors_permissive);
        assert_eq!(
            config.audit.db_path,
            Some(PathBuf::from("/var/lib/billsplit/audit.db"))
        );
        assert_eq!(config.audit.cache_capacity, 8);
    }
}

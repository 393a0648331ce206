//! Application configuration.

use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding `backend_url`.
pub const ENV_BACKEND_URL: &str = "LODESTAR_BACKEND_URL";

/// Environment variable overriding `request_timeout_secs`.
pub const ENV_REQUEST_TIMEOUT: &str = "LODESTAR_REQUEST_TIMEOUT_SECS";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed config file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value could not be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Application configuration, as served in `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Base URL of the engagement backend
    pub backend_url: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validated()
    }

    /// Apply `LODESTAR_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend_url = url;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_REQUEST_TIMEOUT.to_string(),
                value: raw.clone(),
            })?;
        }
        self.validated()
    }

    /// Reject settings no request could succeed with.
    fn validated(self) -> Result<Self, ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "requestTimeoutSecs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(self)
    }

    /// Set backend URL.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Supplies the current configuration. Read on every provider operation.
pub trait ConfigSource: Send + Sync {
    /// Current configuration snapshot.
    fn app_config(&self) -> AppConfig;
}

/// Configuration held in memory, replaceable at runtime.
#[derive(Debug, Default)]
pub struct StaticConfig {
    config: RwLock<AppConfig>,
}

impl StaticConfig {
    /// Wrap a configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replace the configuration.
    pub fn set(&self, config: AppConfig) {
        match self.config.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}

impl ConfigSource for StaticConfig {
    fn app_config(&self) -> AppConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_camel_case() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"backendUrl": "https://api.example.com"}}"#).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.backend_url, "https://api.example.com");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default()
            .with_overrides(|key| match key {
                ENV_BACKEND_URL => Some("http://localhost:8080".to_string()),
                ENV_REQUEST_TIMEOUT => Some(" 5 ".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.backend_url, "http://localhost:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let err = AppConfig::default()
            .with_overrides(|key| (key == ENV_REQUEST_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::default()
            .with_overrides(|key| (key == ENV_REQUEST_TIMEOUT).then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"backendUrl": "http://a", "requestTimeoutSecs": 0}"#).unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_static_config_can_change() {
        let source = StaticConfig::new(AppConfig::default().with_backend_url("http://a"));
        source.set(AppConfig::default().with_backend_url("http://b"));
        assert_eq!(source.app_config().backend_url, "http://b");
    }
}

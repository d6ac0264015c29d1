//! User preferences, persisted as TOML.
//!
//! ```toml
//! enabled = true
//! host = "localhost"
//! port = 9876
//! log_filter = "info"
//!
//! [reconnect]
//! max_attempts = 5
//! step_secs = 2
//!
//! [requests]
//! health_timeout_ms = 2000
//! suggest_timeout_ms = 5000
//! ```
//!
//! Every field is optional; missing ones take the defaults above.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hearthcoach_http::RequestConfig;
use hearthcoach_retry::ReconnectPolicy;
use hearthcoach_session::{DEFAULT_HOST, DEFAULT_PORT, Endpoint, SessionConfig};
use serde::{Deserialize, Serialize};

/// Errors reading or writing the preferences file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("serializing config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("writing config file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Retry settings as they appear in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub max_attempts: u32,
    pub step_secs: u64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: ReconnectPolicy::DEFAULT_MAX_ATTEMPTS,
            step_secs: ReconnectPolicy::DEFAULT_STEP.as_secs(),
        }
    }
}

/// Discrete-call timeouts as they appear in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    pub health_timeout_ms: u64,
    pub suggest_timeout_ms: u64,
}

impl Default for RequestSettings {
    fn default() -> Self {
        let defaults = RequestConfig::default();
        Self {
            health_timeout_ms: defaults.health_timeout.as_millis() as u64,
            suggest_timeout_ms: defaults.suggest_timeout.as_millis() as u64,
        }
    }
}

/// Companion preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Connect to the server at all.
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub reconnect: ReconnectSettings,
    pub requests: RequestSettings,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            log_filter: "info".to_owned(),
            reconnect: ReconnectSettings::default(),
            requests: RequestSettings::default(),
        }
    }
}

impl CompanionConfig {
    /// Reads the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Reads the file at `path`, or returns the defaults if it doesn't
    /// exist. Any other failure is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_owned(),
                source,
            }),
        }
    }

    /// Writes the preferences to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, text).map_err(write_err)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Retry limits; nonsensical values are corrected with a warning.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.reconnect.max_attempts,
            Duration::from_secs(self.reconnect.step_secs),
        )
        .validated()
    }

    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            health_timeout: Duration::from_millis(self.requests.health_timeout_ms),
            suggest_timeout: Duration::from_millis(self.requests.suggest_timeout_ms),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.endpoint(),
            reconnect: self.reconnect_policy(),
            ..SessionConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompanionConfig::default();
        assert!(config.enabled);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 9876);
        assert_eq!(config.reconnect_policy(), ReconnectPolicy::default());
        assert_eq!(config.request_config(), RequestConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: CompanionConfig = toml::from_str(
            r#"
            host = "192.168.1.20"

            [reconnect]
            max_attempts = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "192.168.1.20");
        assert_eq!(config.port, 9876);
        assert!(config.enabled);
        assert_eq!(config.reconnect.max_attempts, 3);
        assert_eq!(config.reconnect.step_secs, 2);
        assert_eq!(config.requests.suggest_timeout_ms, 5000);
    }

    #[test]
    fn test_zero_step_is_corrected() {
        let mut config = CompanionConfig::default();
        config.reconnect.step_secs = 0;
        assert_eq!(config.reconnect_policy().step, ReconnectPolicy::DEFAULT_STEP);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("hearthcoach.toml");
        let config = CompanionConfig {
            enabled: false,
            port: 9000,
            ..CompanionConfig::default()
        };

        config.save(&path).unwrap();

        assert_eq!(CompanionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompanionConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CompanionConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompanionConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "port = \"not a number\"").unwrap();

        let err = CompanionConfig::load_or_default(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}

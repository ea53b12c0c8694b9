//! Application configuration.
//!
//! Loaded from a TOML file, for example:
//!
//! ```toml
//! base_url = "https://tasks.example.com"
//! db_path = "/var/lib/taskboard/taskboard.sqlite3"
//! log_level = "info"
//! log_dir = "/var/log/taskboard"
//! ```
//!
//! `TASKBOARD_BASE_URL` overrides `base_url` when set.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const BASE_URL_ENV: &str = "TASKBOARD_BASE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public origin used to build share links.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// SQLite database file. `None` keeps data in memory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    #[serde(default = "default_level")]
    pub log_level: String,

    /// Rolling log directory. `None` disables file logging.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            db_path: None,
            log_level: default_level(),
            log_dir: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_level() -> String {
    default_log_level().to_string()
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidBaseUrl(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidBaseUrl(value) => {
                write!(f, "base_url must start with http:// or https://, got `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidBaseUrl(_) | Self::InvalidLogLevel(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl AppConfig {
    /// Reads, parses and validates a config file, then applies env overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates TOML text without consulting the environment.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.base_url = base_url;
        }
    }

    /// Normalizes fields in place and rejects invalid values.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        self.base_url = base_url;
        self.log_level = normalize_level(&self.log_level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(())
    }

    /// Shareable detail-page link for `task_id`.
    pub fn share_url(&self, task_id: &str) -> String {
        share_url(&self.base_url, task_id)
    }
}

/// Builds `<base_url>/task/<task_id>`.
pub fn share_url(base_url: &str, task_id: &str) -> String {
    format!("{}/task/{task_id}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::{share_url, AppConfig, ConfigError, BASE_URL_ENV};

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.db_path.is_none());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn base_url_is_trimmed_and_checked() {
        let config = AppConfig::from_toml_str("base_url = \"https://tasks.example.com/\"")
            .expect("valid base url");
        assert_eq!(config.base_url, "https://tasks.example.com");
        assert_eq!(
            config.share_url("abc"),
            "https://tasks.example.com/task/abc"
        );

        let err = AppConfig::from_toml_str("base_url = \"tasks.example.com\"")
            .expect_err("scheme is required");
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn log_level_is_normalized() {
        let config =
            AppConfig::from_toml_str("log_level = \"WARNING\"").expect("warning is accepted");
        assert_eq!(config.log_level, "warn");

        let err = AppConfig::from_toml_str("log_level = \"loud\"").expect_err("unknown level");
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(|key| {
            (key == BASE_URL_ENV).then(|| "https://override.example.com".to_string())
        });
        config.validate().expect("override is valid");
        assert_eq!(config.base_url, "https://override.example.com");
    }

    #[test]
    fn share_url_joins_base_and_id() {
        assert_eq!(
            share_url("http://localhost:3000", "t1"),
            "http://localhost:3000/task/t1"
        );
    }
}

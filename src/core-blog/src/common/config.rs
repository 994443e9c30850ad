//! Typed service configuration.
//!
//! Loaded once at startup from a TOML file (default `config.toml`, or the path in
//! `BLOG_CONFIG`), then overlaid with environment variables and validated.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::auth_config::AuthConfig;
use super::db_env::DatabaseConfig;
use super::hostname::ServerConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub app: ServerConfig,
    pub database: DatabaseConfig,
    pub session: AuthConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidOverride { var: &'static str, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Parses a TOML document without consulting the environment.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Replaces file values with DATABASE_URL, SESSION_SECRET, HOST and PORT when `lookup` has them.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(key) = lookup("SESSION_SECRET") {
            self.session.key = key;
        }
        if let Some(host) = lookup("HOST") {
            self.app.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.app.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var: "PORT", value: port })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive".to_string()));
        }
        if self.app.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("app.request_timeout_seconds must be positive".to_string()));
        }
        self.app.socket_addr().map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.session.validate().map_err(ConfigError::Invalid)
    }
}

/// Resolves the config file path from BLOG_CONFIG, defaulting to `config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var("BLOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Reads, overlays and validates the configuration at `path`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = AppConfig::from_toml(&contents)?;
    config.apply_overrides(|var| std::env::var(var).ok())?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

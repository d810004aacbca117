//! Configuration module for loading TOML configuration files and applying
//! environment overrides.

use deribit_client::{ClientConfig, DEFAULT_BASE_URL, RetryPolicy};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Response cache configuration.
    pub cache: CacheConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Upstream market-data API configuration.
    pub upstream: UpstreamConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Origins allowed by CORS; `*` or empty allows any.
    pub allowed_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: "*".to_string(),
        }
    }
}

impl ServerConfig {
    /// Explicit CORS origins, or `None` when any origin is allowed.
    #[must_use]
    pub fn origin_list(&self) -> Option<Vec<String>> {
        let trimmed = self.allowed_origins.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return None;
        }
        Some(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live of cached responses in milliseconds.
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_ms: 15_000 }
    }
}

impl CacheConfig {
    /// TTL as a duration.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level name: `silent`, `error`, `warn`, `info`, `debug` or `trace`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Default `EnvFilter` directive for the configured level.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => "off".to_string(),
            "debug" => "debug,tower_http=debug".to_string(),
            "trace" => "trace".to_string(),
            "" => "info".to_string(),
            other => format!("{},tower_http=info", other),
        }
    }
}

/// Upstream market-data API configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the public REST API.
    pub base_url: String,
    /// Timeout of a single attempt in milliseconds.
    pub timeout_ms: u64,
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Base backoff in milliseconds; retry `n` waits `n` times this.
    pub backoff_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 15_000,
            retries: 2,
            backoff_ms: 400,
        }
    }
}

impl UpstreamConfig {
    /// Client configuration for this upstream.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            retry: RetryPolicy {
                retries: self.retries,
                backoff: Duration::from_millis(self.backoff_ms),
            },
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the file at `path` if it exists, defaults otherwise, then applies
    /// environment overrides and validates the result.
    ///
    /// # Errors
    /// Returns error if the file exists but is invalid, or an override does
    /// not parse.
    pub fn from_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_env_with(path, |key| std::env::var(key).ok())
    }

    /// [`Config::from_env`] with variables read through `lookup`.
    ///
    /// # Errors
    /// Same as [`Config::from_env`].
    pub fn from_env_with<P, F>(path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Config::default()
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides values with the variables `lookup` returns.
    ///
    /// # Errors
    /// Returns error if a numeric variable does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins;
        }
        if let Some(ttl) = lookup("CACHE_TTL_MS") {
            self.cache.ttl_ms = parse_var("CACHE_TTL_MS", &ttl)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(base_url) = lookup("DERIBIT_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(timeout) = lookup("UPSTREAM_TIMEOUT_MS") {
            self.upstream.timeout_ms = parse_var("UPSTREAM_TIMEOUT_MS", &timeout)?;
        }
        if let Some(retries) = lookup("UPSTREAM_RETRIES") {
            self.upstream.retries = parse_var("UPSTREAM_RETRIES", &retries)?;
        }
        if let Some(backoff) = lookup("UPSTREAM_BACKOFF_MS") {
            self.upstream.backoff_ms = parse_var("UPSTREAM_BACKOFF_MS", &backoff)?;
        }
        Ok(())
    }

    /// Validates the configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue(
                "server port must be positive".to_string(),
            ));
        }
        if self.cache.ttl_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "cache ttl_ms must be positive".to_string(),
            ));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "upstream timeout_ms must be positive".to_string(),
            ));
        }
        if let Err(err) = url::Url::parse(&self.upstream.base_url) {
            return Err(ConfigError::InvalidValue(format!(
                "upstream base_url {} is not a valid URL: {}",
                self.upstream.base_url, err
            )));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{} must be a number, got {}", name, value)))
}

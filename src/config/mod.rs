use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Prefix of every environment variable the service reads
pub const ENV_PREFIX: &str = "MARKET";

/// Longest idle time a session may be configured to survive (30 days)
pub const MAX_SESSION_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Environment variable missing: {name}")]
    MissingEnvironmentVariable { name: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub sessions: SessionConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

/// Where the catalog and order backend lives
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub backend_url: String,
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "default_session_sweep_interval")]
    pub session_sweep_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

impl Config {
    /// Load configuration from `MARKET_*` environment variables
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");
        Self::load(None)
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment. Keys keep their `MARKET_` prefix.
    pub fn from_map(variables: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(variables))
    }

    fn load(variables: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(variables))
            .build()
            .map_err(|e| ConfigError::LoadError {
                message: format!("Failed to load config: {}", e),
            })?;

        let config = Config {
            server: section(&settings, "server")?,
            backend: section(&settings, "backend")?,
            sessions: section(&settings, "session")?,
            observability: section(&settings, "observability")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Request timeout cannot be 0".to_string(),
            });
        }

        if self.server.max_request_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "Maximum request size cannot be 0".to_string(),
            });
        }

        let backend_url = self.backend.backend_url.trim();
        if backend_url.is_empty() {
            return Err(ConfigError::MissingEnvironmentVariable {
                name: format!("{}_BACKEND_URL", ENV_PREFIX),
            });
        }

        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(ConfigError::ValidationError {
                message: format!("Backend URL must be http or https: {}", backend_url),
            });
        }

        if self.backend.upstream_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Upstream timeout cannot be 0".to_string(),
            });
        }

        if self.sessions.session_ttl_seconds == 0
            || self.sessions.session_ttl_seconds > MAX_SESSION_TTL_SECONDS
        {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Session TTL must be between 1 and {} seconds",
                    MAX_SESSION_TTL_SECONDS
                ),
            });
        }

        if self.sessions.session_sweep_interval_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "Session sweep interval cannot be 0".to_string(),
            });
        }

        Ok(())
    }
}

fn section<T: DeserializeOwned>(settings: &config::Config, name: &str) -> Result<T, ConfigError> {
    settings
        .clone()
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", name, e),
        })
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl BackendConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}

impl SessionConfig {
    /// Idle time after which a session and its cart are dropped
    pub fn ttl(&self) -> chrono::Duration {
        let seconds = self.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_seconds)
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024 // 1MB
}

pub(crate) fn default_upstream_timeout() -> u64 {
    10
}

pub(crate) fn default_session_ttl() -> u64 {
    60 * 60
}

pub(crate) fn default_session_sweep_interval() -> u64 {
    60
}

pub(crate) fn default_service_name() -> String {
    "hybrid-market".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

//! Configuration management for daily-shuffle
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Command-line flags are applied on top by the
//! binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::scheduler::TriggerConfig;
use crate::storage::StoreBackend;
use crate::utils::time::Zone;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub store: StoreConfig,

    /// Daily publish trigger
    pub schedule: TriggerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Log every request through the tower-http trace layer
    pub enable_request_logging: bool,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend holding the collection
    pub backend: StoreBackend,

    /// SQLite database path
    pub sqlite_path: PathBuf,

    /// Collection (table) name
    pub collection: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
            enable_request_logging: true,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            sqlite_path: PathBuf::from("data/daily_shuffle.db"),
            collection: String::from("daily_shuffle"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl ServerConfig {
    /// Parse host and port into a socket address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address: {}:{}", self.host, self.port))
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("DAILY_SHUFFLE_HOST").unwrap_or(defaults.server.host);

        let port = match std::env::var("DAILY_SHUFFLE_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("DAILY_SHUFFLE_PORT is not a valid port: {v}"))?,
            Err(_) => defaults.server.port,
        };

        let enable_request_logging = env_bool("DAILY_SHUFFLE_REQUEST_LOGGING")
            .unwrap_or(defaults.server.enable_request_logging);

        let backend = match std::env::var("DAILY_SHUFFLE_STORE") {
            Ok(v) => v.parse::<StoreBackend>()?,
            Err(_) => defaults.store.backend,
        };

        let sqlite_path = std::env::var("DAILY_SHUFFLE_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store.sqlite_path);

        let collection =
            std::env::var("DAILY_SHUFFLE_COLLECTION").unwrap_or(defaults.store.collection);

        let publish_time =
            std::env::var("DAILY_SHUFFLE_PUBLISH_TIME").unwrap_or(defaults.schedule.publish_time);

        let timezone = match std::env::var("DAILY_SHUFFLE_TIMEZONE") {
            Ok(v) => v.parse::<Zone>()?,
            Err(_) => defaults.schedule.timezone,
        };

        let log_level =
            std::env::var("DAILY_SHUFFLE_LOG_LEVEL").unwrap_or(defaults.logging.level);

        let log_format =
            std::env::var("DAILY_SHUFFLE_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                enable_request_logging,
            },
            store: StoreConfig {
                backend,
                sqlite_path,
                collection,
            },
            schedule: TriggerConfig {
                enabled: env_bool("DAILY_SHUFFLE_SCHEDULE_ENABLED")
                    .unwrap_or(defaults.schedule.enabled),
                publish_time,
                timezone,
                publish_on_startup: env_bool("DAILY_SHUFFLE_PUBLISH_ON_STARTUP")
                    .unwrap_or(defaults.schedule.publish_on_startup),
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server.bind_address()?;

        if self.store.collection.is_empty() {
            anyhow::bail!("store.collection must not be empty");
        }

        self.schedule.validate()?;

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            );
        }

        Ok(())
    }
}

//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging. Notification
//! channels live in their own JSON document, see
//! [`IntegrationsConfig`](crate::alerts::IntegrationsConfig).

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Timing shared by every command
    pub general: GeneralConfig,
    /// Where the monitor reads metrics from
    pub monitor: MonitorSettings,
    /// Dashboard HTTP server
    pub server: ServerConfig,
    /// System stat collectors behind the dashboard endpoints
    pub collectors: CollectorsConfig,
}

impl Config {
    /// Reject values that would make the monitor or server unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "general.interval_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.general.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "general.request_timeout_seconds".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.port".to_string(),
                message: "must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Monitor tick interval in seconds
    pub interval_seconds: u64,
    /// Deadline for a single metric read
    pub request_timeout_seconds: u64,
    /// Deadline for a single notification request
    pub notify_timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            request_timeout_seconds: 5,
            notify_timeout_seconds: 10,
        }
    }
}

impl GeneralConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_seconds)
    }
}

/// Monitor endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Base URL of the dashboard server exposing system metrics
    pub dashboard_url: String,
    /// Pool API pools endpoint
    pub pool_api_url: String,
    /// Integrations JSON document
    pub integrations: PathBuf,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            dashboard_url: "http://localhost:8888".to_string(),
            pool_api_url: "http://localhost:4000/api/pools".to_string(),
            integrations: crate::alerts::IntegrationsConfig::default_path(),
        }
    }
}

/// Dashboard server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory static files are served from
    pub static_dir: PathBuf,
    /// Page served for `/`, relative to `static_dir`
    pub index_page: String,
    /// Pool API that `/api/*` requests are forwarded to
    pub upstream_url: String,
    /// Deadline for a proxied request
    pub proxy_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            static_dir: PathBuf::from("."),
            index_page: "public/index.html".to_string(),
            upstream_url: "http://localhost:4000".to_string(),
            proxy_timeout_seconds: 30,
        }
    }
}

impl ServerConfig {
    pub fn proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_timeout_seconds)
    }

    /// `host:port` listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorsConfig {
    /// Filesystem whose usage is reported
    pub disk_root: PathBuf,
    /// Docker container running PostgreSQL
    pub postgres_container: String,
    pub postgres_user: String,
    pub postgres_database: String,
    /// Blockchain node data directory
    pub node_data_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub backups_dir: PathBuf,
    /// Deadline for quick commands (`df`, `top`, `free`, `psql`)
    pub command_timeout_seconds: u64,
    /// Deadline for slow commands (`du`, `docker stats`, `docker system df`)
    pub slow_command_timeout_seconds: u64,
}

impl Default for CollectorsConfig {
    fn default() -> Self {
        Self {
            disk_root: PathBuf::from("/"),
            postgres_container: "ergo-miningcore-postgres".to_string(),
            postgres_user: "miningcore".to_string(),
            postgres_database: "miningcore".to_string(),
            node_data_dir: dirs::home_dir()
                .map(|home| home.join(".ergo"))
                .unwrap_or_else(|| PathBuf::from(".ergo")),
            logs_dir: PathBuf::from("logs"),
            backups_dir: PathBuf::from("backups"),
            command_timeout_seconds: 5,
            slow_command_timeout_seconds: 10,
        }
    }
}

impl CollectorsConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }

    pub fn slow_command_timeout(&self) -> Duration {
        Duration::from_secs(self.slow_command_timeout_seconds)
    }
}

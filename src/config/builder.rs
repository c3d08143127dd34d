//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;
use std::path::PathBuf;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must load; without one the default locations are
    /// searched and defaults are kept if none is found.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => self.config = ConfigFile::load(path)?,
            None => {
                if let Some(cfg) = ConfigFile::load_default() {
                    self.config = cfg;
                }
            }
        }
        Ok(self)
    }

    /// Override with CLI interval
    pub fn with_interval(mut self, interval: Option<u64>) -> Self {
        if let Some(i) = interval {
            self.config.general.interval_seconds = i;
        }
        self
    }

    /// Override with CLI integrations path
    pub fn with_integrations(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.config.monitor.integrations = p;
        }
        self
    }

    /// Override with CLI dashboard URL
    pub fn with_dashboard_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.monitor.dashboard_url = u;
        }
        self
    }

    /// Override with CLI pool API URL
    pub fn with_pool_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.monitor.pool_api_url = u;
        }
        self
    }

    /// Override with CLI listen host
    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(h) = host {
            self.config.server.host = h;
        }
        self
    }

    /// Override with CLI listen port
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(p) = port {
            self.config.server.port = p;
        }
        self
    }

    /// Override with CLI static directory
    pub fn with_static_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.server.static_dir = d;
        }
        self
    }

    /// Override with CLI upstream URL
    pub fn with_upstream_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.server.upstream_url = u;
        }
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

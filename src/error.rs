//! Unified error types for poolwatch
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error reading a metric from a collaborator
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Error delivering a notification
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Error from the dashboard HTTP server
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Integrations file is missing
    #[error("Integrations file not found: {0}")]
    IntegrationsNotFound(String),

    /// Integrations file loaded but every channel is disabled
    #[error("No notification channels are enabled")]
    NoChannelsEnabled,

    /// Every enabled channel is missing its credentials
    #[error("No enabled channel is usable; missing credentials for: {0}")]
    NoUsableChannels(String),

    /// One or more channel checks failed
    #[error("{0} channel check(s) failed")]
    ChecksFailed(usize),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors from reading a metric
///
/// Every variant means "the reading is unavailable for this tick". None of
/// them may be interpreted as a zero reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The read did not complete within its deadline
    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Transport-level failure (connection refused, DNS, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// Collaborator answered with a non-success status
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// Response body could not be decoded into the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The field exists but was reported unavailable
    #[error("Metric unavailable: {0}")]
    Unavailable(String),

    /// A system command failed or exited non-zero
    #[error("Command '{program}' failed: {message}")]
    Command { program: String, message: String },
}

/// Errors from a notification channel
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Channel is switched off in the integrations file
    #[error("{0} integration is disabled")]
    Disabled(String),

    /// Alert kind is not in the channel's allow-list
    #[error("Alert type '{0}' is disabled")]
    KindDisabled(String),

    /// Credentials or target are missing
    #[error("{0} not configured")]
    MissingCredentials(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Remote end rejected the message
    #[error("Rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Errors from the dashboard HTTP server
#[derive(Error, Debug)]
pub enum ServerError {
    /// Host/port did not form a socket address
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    /// Could not bind the listening socket
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Proxy HTTP client could not be constructed
    #[error("Failed to build proxy client: {0}")]
    Client(String),

    /// Server loop terminated with an error
    #[error("Server failed: {0}")]
    Serve(std::io::Error),
}

impl ServerError {
    /// Whether the bind failed because the port is taken
    pub fn is_addr_in_use(&self) -> bool {
        matches!(
            self,
            Self::Bind { source, .. } if source.kind() == std::io::ErrorKind::AddrInUse
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

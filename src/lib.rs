//! poolwatch - mining pool monitoring library
//!
//! Dashboard HTTP front-end plus a background monitor that turns periodic
//! pool and host readings into de-duplicated alerts.
//!
//! # Modules
//!
//! - [`alerts`]: Alert state machine and notification channels
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`error`]: Error types
//! - [`metrics`]: Metric snapshots, sources and host collectors
//! - [`server`]: Dashboard HTTP server
//! - [`services`]: Check round and monitor loop

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod services;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};

//! Service layer for pool monitoring
//!
//! The alert service runs one round of checks; the monitor repeats it on a
//! schedule.

pub mod alert_service;
pub mod monitor;

pub use alert_service::{AlertService, TickReport};
pub use monitor::{interrupt_channel, Monitor, MonitorConfig};

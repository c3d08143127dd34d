//! Metric readings
//!
//! [`MetricsSource`] is what the monitor polls each tick. [`HttpMetricsSource`]
//! reads the dashboard's system endpoints and the pool API;
//! [`SystemCollector`] produces those system snapshots from host commands.

mod collect;
mod command;
mod http;
mod types;

pub use collect::SystemCollector;
pub use command::run_command;
pub use http::HttpMetricsSource;
pub use types::{
    na, timestamp_now, ComponentSizes, ComponentsReport, ContainerStats, DiskSnapshot,
    DockerReport, LoadAverage, MemoryUsage, PerformanceReport, PerformanceSnapshot, PoolStatus,
    PostgresSizes,
};

use crate::error::MetricsError;
use async_trait::async_trait;

/// Source of point-in-time readings
///
/// Every read is independent: one failing says nothing about the others.
/// An `Err` means the reading is unavailable for this tick.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Disk usage of the pool host
    async fn disk_usage(&self) -> Result<DiskSnapshot, MetricsError>;

    /// Pool API reachability
    ///
    /// A transport failure is itself the answer (`Unreachable`), so this
    /// read cannot fail.
    async fn pool_status(&self) -> PoolStatus;

    /// CPU, memory and load
    async fn performance(&self) -> Result<PerformanceSnapshot, MetricsError>;

    /// Peers connected to the blockchain node
    async fn connected_peers(&self) -> Result<u32, MetricsError>;
}

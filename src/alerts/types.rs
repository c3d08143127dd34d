//! Alert system domain types
//!
//! Defines the alert kinds, monitored conditions, emitted events and the
//! lifecycle notices sent outside the alert allow-lists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Notification category
///
/// These are the keys used in each channel's `alerts` allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    /// Pool API unreachable or unhealthy (also used for its recovery)
    PoolOffline,
    /// Disk usage at or above the critical threshold
    DiskSpaceCritical,
    /// Disk usage at or above the warning threshold
    DiskSpaceWarning,
    /// CPU usage at or above threshold
    HighCpuUsage,
    /// Memory usage at or above threshold
    HighMemoryUsage,
    /// Node has no connected peers
    NodeDisconnected,
    /// Pool found a block
    NewBlockFound,
}

impl AlertKind {
    /// Every alert kind, in allow-list display order
    pub const ALL: [AlertKind; 7] = [
        Self::PoolOffline,
        Self::DiskSpaceCritical,
        Self::DiskSpaceWarning,
        Self::HighCpuUsage,
        Self::HighMemoryUsage,
        Self::NodeDisconnected,
        Self::NewBlockFound,
    ];

    /// Allow-list key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoolOffline => "poolOffline",
            Self::DiskSpaceCritical => "diskSpaceCritical",
            Self::DiskSpaceWarning => "diskSpaceWarning",
            Self::HighCpuUsage => "highCpuUsage",
            Self::HighMemoryUsage => "highMemoryUsage",
            Self::NodeDisconnected => "nodeDisconnected",
            Self::NewBlockFound => "newBlockFound",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            Self::PoolOffline => "Pool Offline",
            Self::DiskSpaceCritical => "Disk Space Critical",
            Self::DiskSpaceWarning => "Disk Space Warning",
            Self::HighCpuUsage => "High CPU Usage",
            Self::HighMemoryUsage => "High Memory Usage",
            Self::NodeDisconnected => "Node Disconnected",
            Self::NewBlockFound => "New Block Found",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monitored condition
///
/// Distinct from [`AlertKind`]: a condition is a flag owned by the state
/// machine, a kind is what a channel allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKey {
    DiskCritical,
    DiskWarning,
    PoolOffline,
    CpuHigh,
    MemoryHigh,
    NodeDisconnected,
}

impl ConditionKey {
    /// Every monitored condition
    pub const ALL: [ConditionKey; 6] = [
        Self::DiskCritical,
        Self::DiskWarning,
        Self::PoolOffline,
        Self::CpuHigh,
        Self::MemoryHigh,
        Self::NodeDisconnected,
    ];

    /// Stable identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::DiskCritical => "disk.critical",
            Self::DiskWarning => "disk.warning",
            Self::PoolOffline => "pool.offline",
            Self::CpuHigh => "cpu.high",
            Self::MemoryHigh => "memory.high",
            Self::NodeDisconnected => "node.disconnected",
        }
    }

    /// Alert kind this condition notifies as
    pub fn kind(&self) -> AlertKind {
        match self {
            Self::DiskCritical => AlertKind::DiskSpaceCritical,
            Self::DiskWarning => AlertKind::DiskSpaceWarning,
            Self::PoolOffline => AlertKind::PoolOffline,
            Self::CpuHigh => AlertKind::HighCpuUsage,
            Self::MemoryHigh => AlertKind::HighMemoryUsage,
            Self::NodeDisconnected => AlertKind::NodeDisconnected,
        }
    }

    /// Whether clearing this condition is announced
    pub fn notifies_recovery(&self) -> bool {
        matches!(self, Self::PoolOffline)
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Result of applying a target state to a condition flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `false -> true`
    Fired,
    /// `true -> false`
    Cleared,
    /// Flag already at target
    Unchanged,
}

/// Alert thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Disk usage percent that raises a warning
    pub disk_warning: f64,
    /// Disk usage percent that raises a critical alert
    pub disk_critical: f64,
    /// CPU usage percent
    pub cpu: f64,
    /// Memory usage percent
    pub memory: f64,
    /// Peer count at or below which the node counts as disconnected
    pub min_peers: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            disk_warning: 80.0,
            disk_critical: 90.0,
            cpu: 90.0,
            memory: 90.0,
            min_peers: 0,
        }
    }
}

/// Notification produced by a condition edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Condition that changed
    pub condition: ConditionKey,
    /// Notification category
    pub kind: AlertKind,
    /// Plain-text body
    pub message: String,
    /// Whether this announces a recovery rather than a problem
    pub recovery: bool,
}

impl AlertEvent {
    /// Event for a `false -> true` edge
    pub fn firing(condition: ConditionKey, message: impl Into<String>) -> Self {
        Self {
            condition,
            kind: condition.kind(),
            message: message.into(),
            recovery: false,
        }
    }

    /// Event for an announced `true -> false` edge
    pub fn recovered(condition: ConditionKey, message: impl Into<String>) -> Self {
        Self {
            condition,
            kind: condition.kind(),
            message: message.into(),
            recovery: true,
        }
    }
}

/// Lifecycle message sent to every enabled channel regardless of allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Monitor loop started
    Started { interval: Duration },
    /// Monitor loop stopped
    Stopped,
}

impl Notice {
    /// Short heading
    pub fn title(&self) -> &'static str {
        match self {
            Self::Started { .. } => "🔍 Alert Monitor Started",
            Self::Stopped => "⏹️ Alert Monitor Stopped",
        }
    }

    /// Body text
    pub fn description(&self) -> String {
        match self {
            Self::Started { interval } => format!(
                "Monitoring pool status every {} seconds...",
                interval.as_secs()
            ),
            Self::Stopped => "Monitoring has been stopped".to_string(),
        }
    }
}

/// Block found by the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockFound {
    /// Block height
    pub height: u64,
    /// Reward in ERG
    pub reward: f64,
    /// Effort percentage
    pub effort: f64,
    /// Miner address
    pub miner: String,
}

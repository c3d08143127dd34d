//! Alert manager implementation
//!
//! Holds one flag per monitored condition and turns readings into
//! notification events. Conditions are level-triggered and edge-notified:
//! only a `false -> true` edge (and, for the pool, the recovery edge)
//! produces an event. No I/O happens here.

use super::types::{AlertEvent, ConditionKey, Thresholds, Transition};
use crate::metrics::{DiskSnapshot, PerformanceSnapshot, PoolStatus};

/// Active flag for every monitored condition
///
/// Created all-inactive at startup and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionState {
    pub disk_critical: bool,
    pub disk_warning: bool,
    pub pool_offline: bool,
    pub cpu_high: bool,
    pub memory_high: bool,
    pub node_disconnected: bool,
}

impl ConditionState {
    /// Whether a condition is currently firing
    pub fn is_active(&self, key: ConditionKey) -> bool {
        *self.flag(key)
    }

    /// Conditions currently firing
    pub fn active(&self) -> Vec<ConditionKey> {
        ConditionKey::ALL
            .into_iter()
            .filter(|k| self.is_active(*k))
            .collect()
    }

    fn flag(&self, key: ConditionKey) -> &bool {
        match key {
            ConditionKey::DiskCritical => &self.disk_critical,
            ConditionKey::DiskWarning => &self.disk_warning,
            ConditionKey::PoolOffline => &self.pool_offline,
            ConditionKey::CpuHigh => &self.cpu_high,
            ConditionKey::MemoryHigh => &self.memory_high,
            ConditionKey::NodeDisconnected => &self.node_disconnected,
        }
    }

    fn flag_mut(&mut self, key: ConditionKey) -> &mut bool {
        match key {
            ConditionKey::DiskCritical => &mut self.disk_critical,
            ConditionKey::DiskWarning => &mut self.disk_warning,
            ConditionKey::PoolOffline => &mut self.pool_offline,
            ConditionKey::CpuHigh => &mut self.cpu_high,
            ConditionKey::MemoryHigh => &mut self.memory_high,
            ConditionKey::NodeDisconnected => &mut self.node_disconnected,
        }
    }

    /// Move a flag to `target`, reporting which edge (if any) was taken
    pub fn set(&mut self, key: ConditionKey, target: bool) -> Transition {
        let flag = self.flag_mut(key);
        match (*flag, target) {
            (false, true) => {
                *flag = true;
                Transition::Fired
            }
            (true, false) => {
                *flag = false;
                Transition::Cleared
            }
            _ => Transition::Unchanged,
        }
    }
}

/// Alert manager
///
/// Sole owner and mutator of [`ConditionState`].
#[derive(Debug, Clone, Default)]
pub struct AlertManager {
    thresholds: Thresholds,
    state: ConditionState,
}

impl AlertManager {
    /// Create a manager with default thresholds and every condition inactive
    pub fn new() -> Self {
        Self::default()
    }

    /// Current flags
    pub fn state(&self) -> &ConditionState {
        &self.state
    }

    /// Evaluate disk usage against the two-level ladder
    ///
    /// Critical supersedes warning, so at most one disk condition is active.
    /// Clearing either level is silent.
    pub fn evaluate_disk(&mut self, disk: &DiskSnapshot) -> Vec<AlertEvent> {
        let usage = disk.usage_percent;
        let (critical, warning) = if usage >= self.thresholds.disk_critical {
            (true, false)
        } else if usage >= self.thresholds.disk_warning {
            (false, true)
        } else {
            (false, false)
        };

        // Clear before firing so the ladder invariant holds between the two steps.
        let mut events = Vec::new();
        if !critical {
            self.apply(ConditionKey::DiskCritical, false, String::new, &mut events);
        }
        if !warning {
            self.apply(ConditionKey::DiskWarning, false, String::new, &mut events);
        }
        if critical {
            self.apply(
                ConditionKey::DiskCritical,
                true,
                || {
                    format!(
                        "Disk usage is at *{}%*!\nFree space: {}\nUsed: {} / {}",
                        usage, disk.free, disk.used, disk.total
                    )
                },
                &mut events,
            );
        }
        if warning {
            self.apply(
                ConditionKey::DiskWarning,
                true,
                || {
                    format!(
                        "Disk usage is at *{}%*\nFree space: {}\nConsider cleanup soon.",
                        usage, disk.free
                    )
                },
                &mut events,
            );
        }
        events
    }

    /// Evaluate pool reachability; the only condition with a recovery notice
    pub fn evaluate_pool(&mut self, status: &PoolStatus) -> Option<AlertEvent> {
        let mut events = Vec::new();
        match status {
            PoolStatus::Online => self.apply(
                ConditionKey::PoolOffline,
                false,
                || "✅ Pool is back online!".to_string(),
                &mut events,
            ),
            PoolStatus::HttpStatus(code) => self.apply(
                ConditionKey::PoolOffline,
                true,
                || format!("Pool API returned status {}", code),
                &mut events,
            ),
            PoolStatus::Unreachable(reason) => self.apply(
                ConditionKey::PoolOffline,
                true,
                || format!("Cannot connect to pool API: {}", reason),
                &mut events,
            ),
        }
        events.pop()
    }

    /// Evaluate CPU and memory independently
    ///
    /// A metric missing from the snapshot leaves its flag untouched.
    pub fn evaluate_performance(&mut self, perf: &PerformanceSnapshot) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        match perf.cpu_usage {
            Some(cpu) => self.apply(
                ConditionKey::CpuHigh,
                cpu >= self.thresholds.cpu,
                || format!("CPU usage is at *{}%*", cpu),
                &mut events,
            ),
            None => log::debug!("CPU usage unavailable, leaving {} unchanged", ConditionKey::CpuHigh),
        }

        match &perf.memory {
            Some(mem) => self.apply(
                ConditionKey::MemoryHigh,
                mem.usage_percent >= self.thresholds.memory,
                || {
                    format!(
                        "Memory usage is at *{}%*\nUsed: {} / {}",
                        mem.usage_percent, mem.used, mem.total
                    )
                },
                &mut events,
            ),
            None => log::debug!(
                "Memory usage unavailable, leaving {} unchanged",
                ConditionKey::MemoryHigh
            ),
        }

        events
    }

    /// Evaluate the node's connected peer count
    pub fn evaluate_peers(&mut self, peers: u32) -> Option<AlertEvent> {
        let mut events = Vec::new();
        self.apply(
            ConditionKey::NodeDisconnected,
            peers <= self.thresholds.min_peers,
            || format!("Ergo node has {} connected peers!", peers),
            &mut events,
        );
        events.pop()
    }

    /// Apply a target state and collect the event for a notifying edge
    fn apply<F>(&mut self, key: ConditionKey, target: bool, message: F, events: &mut Vec<AlertEvent>)
    where
        F: FnOnce() -> String,
    {
        match self.state.set(key, target) {
            Transition::Fired => {
                log::info!("Condition {} fired", key);
                events.push(AlertEvent::firing(key, message()));
            }
            Transition::Cleared if key.notifies_recovery() => {
                log::info!("Condition {} recovered", key);
                events.push(AlertEvent::recovered(key, message()));
            }
            Transition::Cleared => log::info!("Condition {} cleared", key),
            Transition::Unchanged if target => {
                log::debug!("Condition {} still active, suppressing repeat", key)
            }
            Transition::Unchanged => {}
        }
    }
}

//! Mock implementations for testing
//!
//! Provides a scripted metrics source and a recording notifier so the
//! monitor can be exercised without a pool host or chat services.

use crate::alerts::{AlertFilter, AlertKind, BlockFound, Notice, Notifier};
use crate::error::MetricsError;
use crate::metrics::{DiskSnapshot, MemoryUsage, MetricsSource, PerformanceSnapshot, PoolStatus};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Disk snapshot at the given usage
pub fn disk(usage_percent: f64) -> DiskSnapshot {
    DiskSnapshot {
        total: "100.0 GB".to_string(),
        used: format!("{:.1} GB", usage_percent),
        free: format!("{:.1} GB", 100.0 - usage_percent),
        usage_percent,
        components: Default::default(),
        timestamp: String::new(),
    }
}

/// Performance snapshot with the given CPU and memory percentages
pub fn performance(cpu: Option<f64>, memory: Option<f64>) -> PerformanceSnapshot {
    PerformanceSnapshot {
        cpu_usage: cpu,
        memory: memory.map(|p| MemoryUsage {
            total: "16000 MB".to_string(),
            used: format!("{} MB", (p * 160.0) as u64),
            usage_percent: p,
        }),
        load_average: None,
        network_available: true,
    }
}

/// Metrics source replaying scripted readings
///
/// Each read pops the next scripted value. Once a script runs out, disk,
/// performance and peer reads report unavailable and the pool reads online.
#[derive(Default)]
pub struct MockMetricsSource {
    disk: Mutex<VecDeque<Result<DiskSnapshot, MetricsError>>>,
    pool: Mutex<VecDeque<PoolStatus>>,
    performance: Mutex<VecDeque<Result<PerformanceSnapshot, MetricsError>>>,
    peers: Mutex<VecDeque<Result<u32, MetricsError>>>,
    delay: Option<Duration>,
    pool_delay: Option<Duration>,
}

impl MockMetricsSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: queue disk readings
    pub fn with_disk(self, readings: impl IntoIterator<Item = Result<DiskSnapshot, MetricsError>>) -> Self {
        self.disk.lock().unwrap().extend(readings);
        self
    }

    /// Builder: queue disk usage percentages
    pub fn with_disk_usage(self, usage: &[f64]) -> Self {
        self.with_disk(usage.iter().map(|&u| Ok(disk(u))))
    }

    /// Builder: queue pool statuses
    pub fn with_pool(self, statuses: impl IntoIterator<Item = PoolStatus>) -> Self {
        self.pool.lock().unwrap().extend(statuses);
        self
    }

    /// Builder: queue performance readings
    pub fn with_performance(
        self,
        readings: impl IntoIterator<Item = Result<PerformanceSnapshot, MetricsError>>,
    ) -> Self {
        self.performance.lock().unwrap().extend(readings);
        self
    }

    /// Builder: queue peer counts
    pub fn with_peers(self, readings: impl IntoIterator<Item = Result<u32, MetricsError>>) -> Self {
        self.peers.lock().unwrap().extend(readings);
        self
    }

    /// Builder: every disk read sleeps this long first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Builder: every pool read sleeps this long first
    pub fn with_pool_delay(mut self, delay: Duration) -> Self {
        self.pool_delay = Some(delay);
        self
    }

    fn exhausted() -> MetricsError {
        MetricsError::Unavailable("no scripted reading".to_string())
    }
}

#[async_trait]
impl MetricsSource for MockMetricsSource {
    async fn disk_usage(&self) -> Result<DiskSnapshot, MetricsError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.disk.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::exhausted()))
    }

    async fn pool_status(&self) -> PoolStatus {
        if let Some(delay) = self.pool_delay {
            tokio::time::sleep(delay).await;
        }
        self.pool
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PoolStatus::Online)
    }

    async fn performance(&self) -> Result<PerformanceSnapshot, MetricsError> {
        let next = self.performance.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::exhausted()))
    }

    async fn connected_peers(&self) -> Result<u32, MetricsError> {
        let next = self.peers.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::exhausted()))
    }
}

/// What a [`MockNotifier`] was asked to send
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Alert(AlertKind, String),
    Notice(String),
    Block(u64),
    Test,
}

/// Notifier recording every call
pub struct MockNotifier {
    name: String,
    enabled: bool,
    succeed: bool,
    filter: AlertFilter,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockNotifier {
    /// Enabled, accepting every kind, always succeeding
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            succeed: true,
            filter: AlertFilter::all(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builder: switched off
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Builder: every delivery reports failure
    pub fn failing(mut self) -> Self {
        self.succeed = false;
        self
    }

    /// Builder: custom allow-list
    pub fn with_filter(mut self, filter: AlertFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Shared handle on the recorded calls
    pub fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: Call) -> bool {
        self.calls.lock().unwrap().push(call);
        self.succeed
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn accepts(&self, kind: AlertKind) -> bool {
        self.filter.allows(kind)
    }

    async fn deliver(&self, kind: AlertKind, message: &str) -> bool {
        self.record(Call::Alert(kind, message.to_string()))
    }

    async fn announce(&self, notice: &Notice) -> bool {
        self.record(Call::Notice(notice.title().to_string()))
    }

    async fn announce_block(&self, block: &BlockFound) -> bool {
        self.record(Call::Block(block.height))
    }

    async fn test_connection(&self) -> bool {
        self.record(Call::Test)
    }
}

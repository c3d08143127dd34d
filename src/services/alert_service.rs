//! Alert service
//!
//! Runs one round of checks: reads each metric, feeds it to the alert state
//! machine, and dispatches whatever events the transitions produced.

use crate::alerts::{
    AlertEvent, AlertManager, ConditionState, Dispatch, NotificationManager, Notice,
};
use crate::error::MetricsError;
use crate::metrics::{MetricsSource, PoolStatus};

use std::future::Future;
use std::time::Duration;

/// Outcome of one round of checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Events the state machine emitted
    pub events: usize,
    /// Delivery attempts across all channels
    pub dispatch: Dispatch,
    /// Checks whose reading was unavailable
    pub failed_reads: Vec<&'static str>,
}

/// Alert service for pool monitoring
pub struct AlertService<S: MetricsSource> {
    source: S,
    manager: AlertManager,
    notifier: NotificationManager,
    read_timeout: Duration,
}

impl<S: MetricsSource> AlertService<S> {
    /// Create a new alert service with default thresholds
    pub fn new(source: S, notifier: NotificationManager, read_timeout: Duration) -> Self {
        Self {
            source,
            manager: AlertManager::new(),
            notifier,
            read_timeout,
        }
    }

    /// Current condition flags
    pub fn state(&self) -> &ConditionState {
        self.manager.state()
    }

    /// Send a lifecycle notice through every enabled channel
    pub async fn announce(&self, notice: &Notice) -> Dispatch {
        self.notifier.announce(notice).await
    }

    /// Run every check once: pool, disk, performance, node
    ///
    /// A failed read is logged and skipped; it never stops the later checks.
    pub async fn run_checks(&mut self) -> TickReport {
        let mut report = TickReport::default();

        let status = self.read_pool().await;
        let event = self.manager.evaluate_pool(&status);
        self.emit(event, &mut report).await;

        match read_with_timeout(self.read_timeout, "disk usage", self.source.disk_usage()).await {
            Ok(disk) => {
                let events = self.manager.evaluate_disk(&disk);
                self.emit(events, &mut report).await;
            }
            Err(e) => Self::skip("disk", &e, &mut report),
        }

        match read_with_timeout(self.read_timeout, "performance", self.source.performance()).await
        {
            Ok(perf) => {
                let events = self.manager.evaluate_performance(&perf);
                self.emit(events, &mut report).await;
            }
            Err(e) => Self::skip("performance", &e, &mut report),
        }

        match read_with_timeout(self.read_timeout, "node peers", self.source.connected_peers())
            .await
        {
            Ok(peers) => {
                let event = self.manager.evaluate_peers(peers);
                self.emit(event, &mut report).await;
            }
            Err(e) => Self::skip("node", &e, &mut report),
        }

        report
    }

    async fn read_pool(&self) -> PoolStatus {
        match tokio::time::timeout(self.read_timeout, self.source.pool_status()).await {
            Ok(status) => status,
            Err(_) => PoolStatus::Unreachable(format!(
                "timed out after {}s",
                self.read_timeout.as_secs()
            )),
        }
    }

    async fn emit(&self, events: impl IntoIterator<Item = AlertEvent>, report: &mut TickReport) {
        for event in events {
            report.events += 1;
            let outcome = self.notifier.dispatch(&event).await;
            report.dispatch.attempted += outcome.attempted;
            report.dispatch.delivered += outcome.delivered;
        }
    }

    fn skip(check: &'static str, err: &MetricsError, report: &mut TickReport) {
        log::warn!("Error checking {}: {}", check, err);
        report.failed_reads.push(check);
    }
}

async fn read_with_timeout<T, F>(timeout: Duration, what: &str, read: F) -> Result<T, MetricsError>
where
    F: Future<Output = Result<T, MetricsError>>,
{
    tokio::time::timeout(timeout, read)
        .await
        .map_err(|_| MetricsError::Timeout {
            what: what.to_string(),
            secs: timeout.as_secs(),
        })?
}

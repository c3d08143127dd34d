//! Monitor loop
//!
//! Drives the alert service on a fixed interval until interrupted.

use crate::alerts::Notice;
use crate::metrics::MetricsSource;
use crate::services::AlertService;

use std::time::Duration;
use tokio::sync::watch;

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between ticks
    pub interval: Duration,
    /// Whether to exit after one tick (no lifecycle notices)
    pub single_use: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            single_use: false,
        }
    }
}

/// Watch channel flipped to `true` on Ctrl+C
///
/// The listener runs as a background task; the monitor only looks at the
/// flag between ticks.
pub fn interrupt_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("Interrupt received, stopping after current tick");
                let _ = tx.send(true);
            }
            Err(e) => {
                log::error!("Failed to listen for interrupt: {}", e);
                // Hold the sender so the monitor keeps running
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}

/// Resolves once the flag is `true`; never resolves if the sender is gone
async fn interrupted(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Monitor loop
pub struct Monitor<S: MetricsSource> {
    config: MonitorConfig,
    service: AlertService<S>,
}

impl<S: MetricsSource> Monitor<S> {
    /// Create a new monitor with the given configuration
    pub fn new(config: MonitorConfig, service: AlertService<S>) -> Self {
        Self { config, service }
    }

    /// Run until `shutdown` flips, returning the number of ticks run
    ///
    /// A tick always runs to completion; the shutdown signal only cuts the
    /// sleep between ticks short.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> u64 {
        if !self.config.single_use {
            self.service
                .announce(&Notice::Started {
                    interval: self.config.interval,
                })
                .await;
        }

        let mut ticks = 0;
        loop {
            ticks += 1;
            log::info!("Running checks (tick {})", ticks);
            let report = self.service.run_checks().await;
            log::info!(
                "Tick {} done: {} event(s), {}/{} deliveries succeeded, {} check(s) unavailable",
                ticks,
                report.events,
                report.dispatch.delivered,
                report.dispatch.attempted,
                report.failed_reads.len()
            );

            if self.config.single_use {
                log::info!("Single-use mode: exiting after one tick");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = interrupted(&mut shutdown) => break,
            }
        }

        if !self.config.single_use {
            log::info!("Alert monitor stopped");
            self.service.announce(&Notice::Stopped).await;
        }

        ticks
    }

    /// Get the monitor configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn service(&self) -> &AlertService<S> {
        &self.service
    }
}

//! Alert notification system
//!
//! Defines the notification channel seam and the manager that fans events
//! out to every enabled, allow-listing channel.

use super::config::IntegrationsConfig;
use super::discord::DiscordNotifier;
use super::telegram::TelegramNotifier;
use super::types::{AlertEvent, AlertKind, BlockFound, Notice};
use crate::error::NotifyError;
use async_trait::async_trait;
use std::time::Duration;

/// Notification channel trait
///
/// Implementations never retry. Every send method returns `false` without
/// side effects when the channel is disabled or misconfigured, and `false`
/// after logging when delivery fails.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for identification
    fn name(&self) -> &str;

    /// Whether the channel is switched on
    fn is_enabled(&self) -> bool;

    /// Whether the channel's allow-list includes this kind
    fn accepts(&self, kind: AlertKind) -> bool;

    /// Deliver an alert of the given kind
    async fn deliver(&self, kind: AlertKind, message: &str) -> bool;

    /// Deliver a lifecycle notice (ignores the allow-list)
    async fn announce(&self, notice: &Notice) -> bool;

    /// Deliver a new-block notification
    async fn announce_block(&self, block: &BlockFound) -> bool;

    /// Check the channel's credentials against the remote service
    async fn test_connection(&self) -> bool;
}

/// Outcome of dispatching one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Channels a delivery was attempted on
    pub attempted: usize,
    /// Channels that reported success
    pub delivered: usize,
}

impl Dispatch {
    pub fn failed(&self) -> usize {
        self.attempted - self.delivered
    }
}

/// Notification manager
///
/// Manages multiple notification channels and dispatches alerts to them
pub struct NotificationManager {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationManager {
    /// Create a new notification manager
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Build the Telegram and Discord channels described by the integrations file
    pub fn from_config(
        config: &IntegrationsConfig,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let mut manager = Self::new();
        manager.add_notifier(Box::new(TelegramNotifier::new(
            config.telegram.clone(),
            timeout,
        )?));
        manager.add_notifier(Box::new(DiscordNotifier::new(
            config.discord.clone(),
            timeout,
        )?));
        Ok(manager)
    }

    /// Add a notifier
    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Get number of registered notifiers
    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    /// Names of enabled notifiers
    pub fn enabled_names(&self) -> Vec<&str> {
        self.enabled().map(|n| n.name()).collect()
    }

    fn enabled(&self) -> impl Iterator<Item = &Box<dyn Notifier>> {
        self.notifiers.iter().filter(|n| n.is_enabled())
    }

    /// Send an alert event to every enabled channel that accepts its kind
    pub async fn dispatch(&self, event: &AlertEvent) -> Dispatch {
        log::warn!("🚨 ALERT: {} - {}", event.kind, event.message);

        let mut outcome = Dispatch::default();
        for notifier in self.enabled() {
            if !notifier.accepts(event.kind) {
                log::debug!(
                    "Alert type '{}' is disabled for {}",
                    event.kind,
                    notifier.name()
                );
                continue;
            }

            outcome.attempted += 1;
            if notifier.deliver(event.kind, &event.message).await {
                outcome.delivered += 1;
            } else {
                log::warn!("Failed to notify via {}", notifier.name());
            }
        }
        outcome
    }

    /// Send a lifecycle notice to every enabled channel
    pub async fn announce(&self, notice: &Notice) -> Dispatch {
        let mut outcome = Dispatch::default();
        for notifier in self.enabled() {
            outcome.attempted += 1;
            if notifier.announce(notice).await {
                outcome.delivered += 1;
            }
        }
        outcome
    }

    /// Send a block notification to every enabled channel that accepts it
    pub async fn announce_block(&self, block: &BlockFound) -> Dispatch {
        let mut outcome = Dispatch::default();
        for notifier in self.enabled() {
            if !notifier.accepts(AlertKind::NewBlockFound) {
                continue;
            }
            outcome.attempted += 1;
            if notifier.announce_block(block).await {
                outcome.delivered += 1;
            }
        }
        outcome
    }

    /// Test every enabled channel, returning `(name, ok)` pairs
    pub async fn test_connections(&self) -> Vec<(String, bool)> {
        let mut results = Vec::new();
        for notifier in self.enabled() {
            results.push((notifier.name().to_string(), notifier.test_connection().await));
        }
        results
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

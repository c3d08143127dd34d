//! Alert and notification system
//!
//! Edge-triggered alert state machine plus the Telegram and Discord channels
//! it notifies through.

mod config;
mod discord;
mod manager;
mod notifier;
mod telegram;
mod types;

pub use config::{AlertFilter, DiscordConfig, IntegrationsConfig, TelegramConfig};
pub use discord::DiscordNotifier;
pub use manager::{AlertManager, ConditionState};
pub use notifier::{Dispatch, NotificationManager, Notifier};
pub use telegram::TelegramNotifier;
pub use types::{
    AlertEvent, AlertKind, BlockFound, ConditionKey, Notice, Thresholds, Transition,
};

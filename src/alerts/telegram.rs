//! Telegram bot channel
//!
//! Sends Markdown messages through the Bot API to every configured chat.

use super::config::TelegramConfig;
use super::notifier::Notifier;
use super::types::{AlertKind, BlockFound, Notice};
use crate::error::NotifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct GetMeResponse {
    result: BotUser,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: String,
}

/// Telegram bot notifier
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
    api_base: String,
}

impl TelegramNotifier {
    /// Create a notifier with a per-request timeout
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            config,
            client,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Point the notifier at another Bot API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn token(&self) -> Result<&str, NotifyError> {
        self.config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NotifyError::MissingCredentials("Bot token".to_string()))
    }

    /// Send a message to every configured chat
    ///
    /// Every chat is attempted; the result is an error if any chat failed.
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        if !self.config.enabled {
            return Err(NotifyError::Disabled("Telegram".to_string()));
        }
        let token = self.token()?;
        if self.config.chat_ids.is_empty() {
            return Err(NotifyError::MissingCredentials("Chat IDs".to_string()));
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let mut last_error = None;

        for chat_id in &self.config.chat_ids {
            let payload = SendMessage {
                chat_id,
                text,
                parse_mode: &self.config.message_format,
            };

            match self.client.post(&url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {
                    log::info!("Telegram message sent to {}", chat_id);
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    log::error!("Error sending to {}: {}", chat_id, body);
                    last_error = Some(NotifyError::Rejected { status, body });
                }
                Err(e) => {
                    // The request URL embeds the bot token
                    let e = e.without_url();
                    log::error!("Exception sending to {}: {}", chat_id, e);
                    last_error = Some(NotifyError::Request(e.to_string()));
                }
            }
        }

        match last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn emoji(kind: AlertKind) -> &'static str {
        match kind {
            AlertKind::PoolOffline => "🔴",
            AlertKind::NodeDisconnected => "⚠️",
            AlertKind::DiskSpaceWarning => "📊",
            AlertKind::DiskSpaceCritical => "🚨",
            AlertKind::HighCpuUsage => "🔥",
            AlertKind::HighMemoryUsage => "💾",
            AlertKind::NewBlockFound => "🎯",
        }
    }

    fn format_alert(kind: AlertKind, details: &str, time: &str) -> String {
        format!(
            "{} *ALERT: {}*\n\n{}\n\n_Time: {}_",
            Self::emoji(kind),
            kind.title(),
            details,
            time
        )
    }

    fn format_block(block: &BlockFound, time: &str) -> String {
        format!(
            "🎯 *NEW BLOCK FOUND!*\n\n*Height:* {}\n*Reward:* {} ERG\n*Effort:* {}%\n*Miner:* `{}`\n\n_Time: {}_",
            block.height, block.reward, block.effort, block.miner, time
        )
    }

    fn report(&self, result: Result<(), NotifyError>) -> bool {
        match result {
            Ok(()) => true,
            Err(NotifyError::Disabled(name)) => {
                log::info!("{} integration is disabled", name);
                false
            }
            Err(e) => {
                log::error!("Telegram delivery failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn accepts(&self, kind: AlertKind) -> bool {
        self.config.alerts.allows(kind)
    }

    async fn deliver(&self, kind: AlertKind, message: &str) -> bool {
        if !self.accepts(kind) {
            log::info!("Alert type '{}' is disabled", kind);
            return false;
        }
        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let text = Self::format_alert(kind, message, &time);
        self.report(self.send_message(&text).await)
    }

    async fn announce(&self, notice: &Notice) -> bool {
        let text = format!("*{}*\n\n{}", notice.title(), notice.description());
        self.report(self.send_message(&text).await)
    }

    async fn announce_block(&self, block: &BlockFound) -> bool {
        if !self.accepts(AlertKind::NewBlockFound) {
            return false;
        }
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        self.report(self.send_message(&Self::format_block(block, &time)).await)
    }

    async fn test_connection(&self) -> bool {
        let token = match self.token() {
            Ok(token) => token,
            Err(e) => {
                log::error!("{}", e);
                return false;
            }
        };

        let url = format!("{}/bot{}/getMe", self.api_base, token);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::error!("Telegram connection failed: {}", e.without_url());
                return false;
            }
        };

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Telegram connection failed: {}", body);
            return false;
        }

        match response.json::<GetMeResponse>().await {
            Ok(me) => {
                log::info!("Connected to bot: @{}", me.result.username);
                true
            }
            Err(e) => {
                log::error!("Unexpected getMe response: {}", e);
                false
            }
        }
    }
}

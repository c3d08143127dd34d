//! Discord webhook channel

use super::config::DiscordConfig;
use super::notifier::Notifier;
use super::types::{AlertKind, BlockFound, Notice};
use crate::error::NotifyError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const FOOTER: &str = "Ergo Mining Pool";

const RED: u32 = 0xFF0000;
const ORANGE: u32 = 0xFFAA00;
const GREEN: u32 = 0x00FF00;
const SALMON: u32 = 0xFF5555;
const TEAL: u32 = 0x00FFAA;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
    footer: Footer,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField>,
}

#[derive(Debug, Serialize)]
struct Footer {
    text: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

impl EmbedField {
    fn inline(name: &'static str, value: String) -> Self {
        Self {
            name,
            value,
            inline: true,
        }
    }
}

/// Discord webhook notifier
pub struct DiscordNotifier {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordNotifier {
    /// Create a notifier with a per-request timeout
    pub fn new(config: DiscordConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn color(kind: AlertKind) -> u32 {
        match kind {
            AlertKind::PoolOffline | AlertKind::DiskSpaceCritical => RED,
            AlertKind::DiskSpaceWarning | AlertKind::HighCpuUsage => ORANGE,
            AlertKind::NewBlockFound => GREEN,
            AlertKind::NodeDisconnected => SALMON,
            AlertKind::HighMemoryUsage => TEAL,
        }
    }

    /// Post a single embed to the webhook
    async fn send_embed(
        &self,
        title: String,
        description: String,
        color: u32,
        fields: Vec<EmbedField>,
    ) -> Result<(), NotifyError> {
        if !self.config.enabled {
            return Err(NotifyError::Disabled("Discord".to_string()));
        }
        let url = self
            .config
            .webhook_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| NotifyError::MissingCredentials("Webhook URL".to_string()))?;

        let payload = WebhookPayload {
            username: &self.config.username,
            avatar_url: Some(self.config.avatar_url.as_str()).filter(|a| !a.is_empty()),
            embeds: vec![Embed {
                title,
                description,
                color,
                timestamp: chrono::Utc::now().to_rfc3339(),
                footer: Footer { text: FOOTER },
                fields,
            }],
        };

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            // The webhook URL is the credential
            .map_err(|e| NotifyError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            log::info!("Discord notification sent");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn report(result: Result<(), NotifyError>) -> bool {
        match result {
            Ok(()) => true,
            Err(NotifyError::Disabled(name)) => {
                log::info!("{} integration is disabled", name);
                false
            }
            Err(e) => {
                log::error!("Discord delivery failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
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
        let title = format!("⚠️ {}", kind.title().to_uppercase());
        Self::report(
            self.send_embed(title, message.to_string(), Self::color(kind), Vec::new())
                .await,
        )
    }

    async fn announce(&self, notice: &Notice) -> bool {
        let color = match notice {
            Notice::Started { .. } => TEAL,
            Notice::Stopped => SALMON,
        };
        Self::report(
            self.send_embed(
                notice.title().to_string(),
                notice.description(),
                color,
                Vec::new(),
            )
            .await,
        )
    }

    async fn announce_block(&self, block: &BlockFound) -> bool {
        if !self.accepts(AlertKind::NewBlockFound) {
            return false;
        }
        let fields = vec![
            EmbedField::inline("Height", format!("`{}`", block.height)),
            EmbedField::inline("Reward", format!("`{} ERG`", block.reward)),
            EmbedField::inline("Effort", format!("`{}%`", block.effort)),
            EmbedField {
                name: "Miner",
                value: format!("`{}`", block.miner),
                inline: false,
            },
        ];
        Self::report(
            self.send_embed(
                "🎯 NEW BLOCK FOUND!".to_string(),
                "A new block has been found by the pool!".to_string(),
                GREEN,
                fields,
            )
            .await,
        )
    }

    async fn test_connection(&self) -> bool {
        Self::report(
            self.send_embed(
                "✅ Discord Integration Test".to_string(),
                "Discord webhook is working correctly!".to_string(),
                TEAL,
                Vec::new(),
            )
            .await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::config::AlertFilter;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> DiscordConfig {
        DiscordConfig {
            enabled: true,
            webhook_url: Some(format!("{}/api/webhooks/1/token", server.uri())),
            username: "Pool Monitor".to_string(),
            avatar_url: String::new(),
            alerts: AlertFilter::default()
                .with(AlertKind::PoolOffline, true)
                .with(AlertKind::NewBlockFound, true),
        }
    }

    fn notifier(config: DiscordConfig) -> DiscordNotifier {
        DiscordNotifier::new(config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_kind_colors() {
        assert_eq!(DiscordNotifier::color(AlertKind::PoolOffline), 0xFF0000);
        assert_eq!(DiscordNotifier::color(AlertKind::HighCpuUsage), 0xFFAA00);
        assert_eq!(DiscordNotifier::color(AlertKind::NewBlockFound), 0x00FF00);
    }

    #[tokio::test]
    async fn test_deliver_posts_embed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(body_partial_json(serde_json::json!({
                "username": "Pool Monitor",
                "embeds": [{
                    "title": "⚠️ POOL OFFLINE",
                    "color": 0xFF0000,
                    "footer": {"text": "Ergo Mining Pool"}
                }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let discord = notifier(config(&server));
        assert!(discord.deliver(AlertKind::PoolOffline, "Pool API returned status 503").await);
    }

    #[tokio::test]
    async fn test_kind_not_allowed_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let discord = notifier(config(&server));
        assert!(!discord.deliver(AlertKind::HighMemoryUsage, "Memory usage is at *95%*").await);
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let discord = notifier(config(&server));
        assert!(!discord.announce(&Notice::Stopped).await);
    }

    #[tokio::test]
    async fn test_missing_webhook_is_failure() {
        let server = MockServer::start().await;
        let mut cfg = config(&server);
        cfg.webhook_url = None;

        let discord = notifier(cfg);
        assert!(!discord.test_connection().await);
    }

    #[tokio::test]
    async fn test_block_embed_has_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "embeds": [{"color": 0x00FF00, "title": "🎯 NEW BLOCK FOUND!"}]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let discord = notifier(config(&server));
        let block = BlockFound {
            height: 123456,
            reward: 67.5,
            effort: 95.3,
            miner: "9f4QF8AD1nQ3nJahQVkMj8hFSVBzVcU".to_string(),
        };
        assert!(discord.announce_block(&block).await);
    }

    #[tokio::test]
    async fn test_transport_error_hides_webhook() {
        let server = MockServer::start().await;
        let mut cfg = config(&server);
        cfg.webhook_url = Some("http://127.0.0.1:1/api/webhooks/1/s3cret-token".to_string());

        let discord = notifier(cfg);
        let err = discord
            .send_embed("t".to_string(), "d".to_string(), TEAL, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Request(_)));
        assert!(!err.to_string().contains("s3cret-token"));
    }
}

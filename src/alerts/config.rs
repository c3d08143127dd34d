//! Notification channel configuration
//!
//! Loads the integrations JSON document describing each channel: whether
//! it is enabled, its credentials or target, and its per-kind allow-list.

use super::types::AlertKind;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-kind allow-list
///
/// Keys are alert kind names (`poolOffline`, `highCpuUsage`, ...). Unknown
/// keys are kept but never match; a kind with no entry is not allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertFilter(BTreeMap<String, bool>);

impl AlertFilter {
    /// Whether the kind is switched on
    pub fn allows(&self, kind: AlertKind) -> bool {
        self.0.get(kind.as_str()).copied().unwrap_or(false)
    }

    /// Allow-list with every kind switched on
    pub fn all() -> Self {
        Self(
            AlertKind::ALL
                .iter()
                .map(|k| (k.as_str().to_string(), true))
                .collect(),
        )
    }

    /// Set a single kind
    pub fn with(mut self, kind: AlertKind, allowed: bool) -> Self {
        self.0.insert(kind.as_str().to_string(), allowed);
        self
    }
}

/// Integrations file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

impl IntegrationsConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Ok(serde_json::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path_str, e)))?)
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        PathBuf::from("config").join("integrations.json")
    }

    /// Names of channels switched on
    pub fn enabled_channels(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.telegram.enabled {
            names.push("telegram");
        }
        if self.discord.enabled {
            names.push("discord");
        }
        names
    }

    /// Whether at least one channel is switched on
    pub fn any_enabled(&self) -> bool {
        !self.enabled_channels().is_empty()
    }

    /// Enabled channels whose credentials are filled in
    pub fn usable_channels(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.telegram.enabled && self.telegram.is_configured() {
            names.push("telegram");
        }
        if self.discord.enabled && self.discord.is_configured() {
            names.push("discord");
        }
        names
    }
}

/// Telegram bot channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default, deserialize_with = "chat_id::deserialize")]
    pub chat_ids: Vec<String>,
    /// Telegram `parse_mode`
    #[serde(default = "default_message_format")]
    pub message_format: String,
    #[serde(default)]
    pub alerts: AlertFilter,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: None,
            chat_ids: Vec::new(),
            message_format: default_message_format(),
            alerts: AlertFilter::default(),
        }
    }
}

impl TelegramConfig {
    /// Bot token and at least one chat are present
    pub fn is_configured(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.is_empty()) && !self.chat_ids.is_empty()
    }
}

fn default_message_format() -> String {
    "Markdown".to_string()
}

/// Discord webhook channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub alerts: AlertFilter,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            username: default_username(),
            avatar_url: String::new(),
            alerts: AlertFilter::default(),
        }
    }
}

impl DiscordConfig {
    /// Webhook URL is present
    pub fn is_configured(&self) -> bool {
        self.webhook_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

fn default_username() -> String {
    "Pool Monitor".to_string()
}

/// Chat ids may be written as numbers or strings
mod chat_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Vec::<Id>::deserialize(deserializer)?
            .into_iter()
            .map(|id| match id {
                Id::Number(n) => n.to_string(),
                Id::Text(s) => s,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "telegram": {
            "enabled": true,
            "botToken": "123:abc",
            "chatIds": [-1001234, "42"],
            "alerts": {
                "poolOffline": true,
                "highCpuUsage": false,
                "paymentFailed": true
            }
        },
        "discord": {
            "enabled": false,
            "webhookUrl": "https://discord.example/webhook",
            "alerts": { "poolOffline": true }
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let config: IntegrationsConfig = serde_json::from_str(SAMPLE).unwrap();
        assert!(config.telegram.enabled);
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.chat_ids, vec!["-1001234", "42"]);
        assert_eq!(config.telegram.message_format, "Markdown");
        assert!(!config.discord.enabled);
        assert_eq!(config.discord.username, "Pool Monitor");
        assert_eq!(config.enabled_channels(), vec!["telegram"]);
    }

    #[test]
    fn test_alert_filter() {
        let config: IntegrationsConfig = serde_json::from_str(SAMPLE).unwrap();
        let alerts = &config.telegram.alerts;
        assert!(alerts.allows(AlertKind::PoolOffline));
        assert!(!alerts.allows(AlertKind::HighCpuUsage));
        // Missing entry means not allowed
        assert!(!alerts.allows(AlertKind::DiskSpaceWarning));
    }

    #[test]
    fn test_filter_builders() {
        let filter = AlertFilter::all().with(AlertKind::HighCpuUsage, false);
        assert!(filter.allows(AlertKind::NewBlockFound));
        assert!(!filter.allows(AlertKind::HighCpuUsage));
    }

    #[test]
    fn test_empty_document_has_nothing_enabled() {
        let config: IntegrationsConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.any_enabled());
    }

    #[test]
    fn test_load_missing_file() {
        let result = IntegrationsConfig::load("/nonexistent/integrations.json");
        assert!(matches!(
            result,
            Err(crate::error::AppError::Config(ConfigError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = IntegrationsConfig::load(file.path()).unwrap();
        assert_eq!(config.telegram.chat_ids, vec!["-1001234", "42"]);
        assert!(config.telegram.is_configured());
    }

    #[test]
    fn test_usable_channels_need_credentials() {
        let mut config = IntegrationsConfig::default();
        config.telegram.enabled = true;
        config.telegram.bot_token = Some("123:abc".to_string());
        assert!(config.any_enabled());
        assert!(config.usable_channels().is_empty());

        config.telegram.chat_ids = vec!["42".to_string()];
        assert_eq!(config.usable_channels(), vec!["telegram"]);

        config.discord.webhook_url = Some("https://discord.com/api/webhooks/1/x".to_string());
        assert_eq!(config.usable_channels(), vec!["telegram"]);
        config.discord.enabled = true;
        assert_eq!(config.usable_channels(), vec!["telegram", "discord"]);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = IntegrationsConfig::load(file.path());
        assert!(matches!(
            result,
            Err(crate::error::AppError::Config(ConfigError::ParseError(_)))
        ));
    }
}

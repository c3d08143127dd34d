//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::alerts::{AlertKind, IntegrationsConfig};
use crate::cli::args::OutputFormat;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

/// One channel's configuration at a glance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatus {
    pub name: String,
    pub enabled: bool,
    /// Credentials or target present
    pub configured: bool,
    /// Telegram chat count; Discord always targets one webhook
    pub targets: usize,
    pub alerts: Vec<AlertKind>,
}

impl ChannelStatus {
    /// Status rows for every channel in the integrations file
    pub fn from_config(config: &IntegrationsConfig) -> Vec<Self> {
        let allowed = |filter: &crate::alerts::AlertFilter| {
            AlertKind::ALL
                .into_iter()
                .filter(|k| filter.allows(*k))
                .collect::<Vec<_>>()
        };

        let telegram = &config.telegram;
        let discord = &config.discord;
        vec![
            Self {
                name: "telegram".to_string(),
                enabled: telegram.enabled,
                configured: telegram.is_configured(),
                targets: telegram.chat_ids.len(),
                alerts: allowed(&telegram.alerts),
            },
            Self {
                name: "discord".to_string(),
                enabled: discord.enabled,
                configured: discord.is_configured(),
                targets: usize::from(discord.webhook_url.is_some()),
                alerts: allowed(&discord.alerts),
            },
        ]
    }
}

impl TableDisplay for ChannelStatus {
    fn to_table(&self) -> String {
        let state = if self.enabled { "enabled" } else { "disabled" };
        let mut output = format!("{} ({})\n", self.name, state);
        output.push_str(&format!(
            "  Configured: {}\n",
            if self.configured { "yes" } else { "no" }
        ));
        output.push_str(&format!("  Targets: {}\n", self.targets));

        if self.alerts.is_empty() {
            output.push_str("  Alerts: none\n");
        } else {
            output.push_str("  Alerts:\n");
            for kind in &self.alerts {
                output.push_str(&format!("    • {}\n", kind));
            }
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{}:{}:{} alert(s)",
            self.name,
            if self.enabled { "on" } else { "off" },
            self.alerts.len()
        )
    }
}

/// Status of every channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStatusList {
    pub channels: Vec<ChannelStatus>,
}

impl TableDisplay for ChannelStatusList {
    fn to_table(&self) -> String {
        self.channels
            .iter()
            .map(|c| c.to_table())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_compact(&self) -> String {
        self.channels
            .iter()
            .map(|c| c.to_compact())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of one channel check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub channel: String,
    pub check: String,
    pub success: bool,
}

/// Results of `channels test`
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

impl TableDisplay for CheckReport {
    fn to_table(&self) -> String {
        let mut output = String::new();
        for r in &self.results {
            let mark = if r.success { '✓' } else { '✗' };
            output.push_str(&format!("{} {:<10} {}\n", mark, r.channel, r.check));
        }
        output
    }

    fn to_compact(&self) -> String {
        let passed = self.results.iter().filter(|r| r.success).count();
        format!("{}/{} checks passed", passed, self.results.len())
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertFilter;

    #[test]
    fn test_channel_status_from_config() {
        let mut config = IntegrationsConfig::default();
        config.telegram.enabled = true;
        config.telegram.bot_token = Some("123:abc".to_string());
        config.telegram.chat_ids = vec!["1".to_string(), "2".to_string()];
        config.telegram.alerts = AlertFilter::default().with(AlertKind::PoolOffline, true);

        let rows = ChannelStatus::from_config(&config);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].enabled && rows[0].configured);
        assert_eq!(rows[0].targets, 2);
        assert_eq!(rows[0].alerts, vec![AlertKind::PoolOffline]);
        assert!(!rows[1].enabled);
        assert!(!rows[1].configured);
    }

    #[test]
    fn test_channel_status_table() {
        let status = ChannelStatus {
            name: "discord".to_string(),
            enabled: false,
            configured: true,
            targets: 1,
            alerts: vec![],
        };
        let output = status.to_table();
        assert!(output.starts_with("discord (disabled)"));
        assert!(output.contains("Alerts: none"));
    }

    #[test]
    fn test_check_report() {
        let report = CheckReport {
            results: vec![
                CheckResult {
                    channel: "telegram".to_string(),
                    check: "connection".to_string(),
                    success: true,
                },
                CheckResult {
                    channel: "discord".to_string(),
                    check: "connection".to_string(),
                    success: false,
                },
            ],
        };
        assert!(!report.all_passed());
        assert_eq!(report.to_compact(), "1/2 checks passed");
        assert!(report.to_table().contains("✗ discord"));
    }

    #[test]
    fn test_message_display() {
        let msg = Message {
            message: "Operation completed".to_string(),
            success: true,
        };

        assert!(msg.to_table().starts_with('✓'));
    }
}

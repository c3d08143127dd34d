//! Channel command implementation
//!
//! Shows what the integrations file configures and exercises the enabled
//! channels end to end.

use super::load_integrations;
use crate::alerts::{AlertEvent, BlockFound, ConditionKey, Dispatch, NotificationManager};
use crate::cli::args::{ChannelCommands, ChannelsArgs, OutputFormat};
use crate::cli::output::{
    print_output, ChannelStatus, ChannelStatusList, CheckReport, CheckResult,
};
use crate::config::ConfigBuilder;
use crate::error::{AppError, Result};

/// Execute channel commands
pub async fn run_channels(
    args: &ChannelsArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_integrations(args.integrations.clone())
        .build()?;
    let integrations = load_integrations(&config.monitor.integrations)?;

    match args.command {
        ChannelCommands::Status => {
            let list = ChannelStatusList {
                channels: ChannelStatus::from_config(&integrations),
            };
            print_output(&list, format)?;
            Ok(())
        }
        ChannelCommands::Test { alert, block } => {
            let manager =
                NotificationManager::from_config(&integrations, config.general.notify_timeout())?;
            let report = run_checks(&manager, alert, block).await?;
            print_output(&report, format)?;

            let failed = report.results.iter().filter(|r| !r.success).count();
            if failed > 0 {
                return Err(AppError::ChecksFailed(failed));
            }
            Ok(())
        }
    }
}

async fn run_checks(manager: &NotificationManager, alert: bool, block: bool) -> Result<CheckReport> {
    let enabled = manager.enabled_names().join(",");
    if enabled.is_empty() {
        return Err(AppError::NoChannelsEnabled);
    }

    let mut results: Vec<CheckResult> = manager
        .test_connections()
        .await
        .into_iter()
        .map(|(channel, success)| CheckResult {
            channel,
            check: "connection".to_string(),
            success,
        })
        .collect();

    if alert {
        let event = AlertEvent::firing(
            ConditionKey::DiskWarning,
            "This is a test alert from poolwatch.\nIf you see this, alerts are working.",
        );
        let outcome = manager.dispatch(&event).await;
        results.push(summary(&enabled, "sample alert", outcome));
    }

    if block {
        let sample = BlockFound {
            height: 123456,
            reward: 67.5,
            effort: 95.3,
            miner: "9f4QF8AD1nQ3nJahQVkMj8hFSVBzVcU".to_string(),
        };
        let outcome = manager.announce_block(&sample).await;
        results.push(summary(&enabled, "sample block", outcome));
    }

    Ok(CheckReport { results })
}

fn summary(channels: &str, check: &str, outcome: Dispatch) -> CheckResult {
    CheckResult {
        channel: channels.to_string(),
        check: format!("{} ({}/{} delivered)", check, outcome.delivered, outcome.attempted),
        success: outcome.attempted > 0 && outcome.failed() == 0,
    }
}

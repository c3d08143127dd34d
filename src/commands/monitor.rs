//! Monitor command implementation

use super::{load_integrations, require_usable_channel};
use crate::alerts::NotificationManager;
use crate::cli::args::MonitorArgs;
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::metrics::HttpMetricsSource;
use crate::services::{interrupt_channel, AlertService, Monitor, MonitorConfig};

/// Run the alert monitor until Ctrl+C (or once with `--once`)
pub async fn run_monitor(args: &MonitorArgs, config_path: Option<&str>) -> Result<()> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_interval(args.interval)
        .with_integrations(args.integrations.clone())
        .with_dashboard_url(args.dashboard_url.clone())
        .with_pool_url(args.pool_url.clone())
        .build()?;

    let integrations = load_integrations(&config.monitor.integrations)?;
    require_usable_channel(&integrations)?;

    let notifier =
        NotificationManager::from_config(&integrations, config.general.notify_timeout())?;
    let source = HttpMetricsSource::new(
        &config.monitor.dashboard_url,
        &config.monitor.pool_api_url,
        config.general.request_timeout(),
    )?;

    log::info!("🔍 Starting alert monitor");
    log::info!("Check interval: {} seconds", config.general.interval_seconds);
    log::info!("Dashboard: {}", config.monitor.dashboard_url);
    log::info!("Pool API: {}", config.monitor.pool_api_url);
    log::info!(
        "Enabled channels: {}",
        integrations.usable_channels().join(", ")
    );

    let service = AlertService::new(source, notifier, config.general.request_timeout());
    let mut monitor = Monitor::new(
        MonitorConfig {
            interval: config.general.interval(),
            single_use: args.once,
        },
        service,
    );

    let ticks = monitor.run(interrupt_channel()).await;
    log::info!("Monitor exited after {} tick(s)", ticks);
    Ok(())
}

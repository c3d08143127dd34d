//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod channels;
pub mod monitor;
pub mod serve;

pub use channels::run_channels;
pub use monitor::run_monitor;
pub use serve::run_serve;

use crate::alerts::IntegrationsConfig;
use crate::error::{AppError, ConfigError, Result};
use std::path::Path;

/// Load the integrations file, reporting a missing file distinctly
pub(crate) fn load_integrations(path: &Path) -> Result<IntegrationsConfig> {
    match IntegrationsConfig::load(path) {
        Err(AppError::Config(ConfigError::FileNotFound(p))) => Err(AppError::IntegrationsNotFound(p)),
        other => other,
    }
}

/// Require at least one enabled channel with credentials filled in
pub(crate) fn require_usable_channel(integrations: &IntegrationsConfig) -> Result<()> {
    let enabled = integrations.enabled_channels();
    if enabled.is_empty() {
        return Err(AppError::NoChannelsEnabled);
    }

    let usable = integrations.usable_channels();
    if usable.is_empty() {
        return Err(AppError::NoUsableChannels(enabled.join(", ")));
    }
    for name in enabled.iter().filter(|n| !usable.contains(n)) {
        log::warn!("{} is enabled but not configured; it will be skipped", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_channel_without_credentials_is_fatal() {
        let mut integrations = IntegrationsConfig::default();
        assert!(matches!(
            require_usable_channel(&integrations),
            Err(AppError::NoChannelsEnabled)
        ));

        integrations.telegram.enabled = true;
        match require_usable_channel(&integrations) {
            Err(AppError::NoUsableChannels(names)) => assert_eq!(names, "telegram"),
            other => panic!("unexpected result: {:?}", other),
        }

        integrations.discord.enabled = true;
        integrations.discord.webhook_url = Some("https://discord.com/api/webhooks/1/x".to_string());
        assert!(require_usable_channel(&integrations).is_ok());
    }

    #[test]
    fn test_missing_integrations_file() {
        let result = load_integrations(Path::new("/nonexistent/integrations.json"));
        assert!(matches!(result, Err(AppError::IntegrationsNotFound(_))));
    }
}

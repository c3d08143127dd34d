//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Mining pool monitor
///
/// Serves the pool dashboard and watches pool health, sending de-duplicated
/// alerts to Telegram and Discord.
#[derive(Parser, Debug)]
#[command(name = "poolwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "POOLWATCH_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dashboard HTTP server
    Serve(ServeArgs),

    /// Run the alert monitor
    Monitor(MonitorArgs),

    /// Inspect and test notification channels
    Channels(ChannelsArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory to serve static files from
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Pool API base URL that /api requests are forwarded to
    #[arg(long)]
    pub upstream: Option<String>,
}

/// Arguments for the monitor command
#[derive(Parser, Debug)]
pub struct MonitorArgs {
    /// Check interval in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Path to the integrations JSON file
    #[arg(long)]
    pub integrations: Option<PathBuf>,

    /// Dashboard server base URL
    #[arg(long)]
    pub dashboard_url: Option<String>,

    /// Pool API pools endpoint
    #[arg(long)]
    pub pool_url: Option<String>,

    /// Run one round of checks and exit
    #[arg(long)]
    pub once: bool,
}

/// Arguments for channel commands
#[derive(Parser, Debug)]
pub struct ChannelsArgs {
    /// Path to the integrations JSON file
    #[arg(long, global = true)]
    pub integrations: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ChannelCommands,
}

/// Channel subcommands
#[derive(Subcommand, Debug)]
pub enum ChannelCommands {
    /// Show each channel's configuration
    Status,

    /// Check each enabled channel's credentials
    Test {
        /// Also send a sample alert
        #[arg(long)]
        alert: bool,

        /// Also send a sample block notification
        #[arg(long)]
        block: bool,
    },
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

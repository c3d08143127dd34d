//! poolwatch - mining pool dashboard server and alert monitor

use clap::Parser;
use poolwatch::cli::args::{generate_completions, Cli, Commands};
use poolwatch::commands::{run_channels, run_monitor, run_serve};
use poolwatch::error::AppError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli).await {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = cli.config.as_deref();

    match &cli.command {
        Commands::Serve(args) => run_serve(args, config).await,

        Commands::Monitor(args) => run_monitor(args, config).await,

        Commands::Channels(args) => run_channels(args, config, cli.format).await,

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::IntegrationsNotFound(_) => {
            eprintln!();
            eprintln!("Hint: Copy config/integrations.json.template to config/integrations.json");
            eprintln!("      and fill in your Telegram and/or Discord credentials.");
        }
        AppError::NoChannelsEnabled => {
            eprintln!();
            eprintln!("Hint: Enable at least one integration in the integrations file:");
            eprintln!("      set \"enabled\": true for telegram or discord.");
        }
        AppError::NoUsableChannels(_) => {
            eprintln!();
            eprintln!("Hint: Fill in botToken and chatIds for telegram, or webhookUrl");
            eprintln!("      for discord, in the integrations file.");
        }
        AppError::Server(server_err) if server_err.is_addr_in_use() => {
            eprintln!();
            eprintln!("Hint: The port is already in use. Stop the other process or pick");
            eprintln!("      another port with --port.");
            eprintln!("      To free it: lsof -ti:<PORT> | xargs kill -9");
        }
        _ => {}
    }
}

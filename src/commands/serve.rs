//! Serve command implementation

use crate::cli::args::ServeArgs;
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::server::DashboardServer;

/// Run the dashboard server until Ctrl+C
pub async fn run_serve(args: &ServeArgs, config_path: Option<&str>) -> Result<()> {
    let config = ConfigBuilder::new()
        .with_file(config_path)?
        .with_host(args.host.clone())
        .with_port(args.port)
        .with_static_dir(args.static_dir.clone())
        .with_upstream_url(args.upstream.clone())
        .build()?;

    let server = DashboardServer::new(config.server, config.collectors)?;
    let listener = server.bind().await?;
    server.serve(listener, shutdown_signal()).await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for interrupt: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down server...");
}

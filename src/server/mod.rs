//! Dashboard HTTP server
//!
//! Serves the static dashboard, answers the system metric endpoints and
//! proxies the rest of `/api` to the pool API.

mod handlers;
mod proxy;
mod routes;

pub use proxy::Proxy;
pub use routes::router;

use crate::config::{CollectorsConfig, ServerConfig};
use crate::error::ServerError;
use crate::metrics::SystemCollector;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// State shared by every request
#[derive(Clone)]
pub struct AppState {
    pub(crate) collector: Arc<SystemCollector>,
    pub(crate) proxy: Arc<Proxy>,
}

impl AppState {
    pub fn new(collectors: CollectorsConfig, proxy: Proxy) -> Self {
        Self {
            collector: Arc::new(SystemCollector::new(collectors)),
            proxy: Arc::new(proxy),
        }
    }
}

/// Dashboard server
pub struct DashboardServer {
    config: ServerConfig,
    state: AppState,
}

impl DashboardServer {
    pub fn new(config: ServerConfig, collectors: CollectorsConfig) -> Result<Self, ServerError> {
        let proxy = Proxy::new(&config.upstream_url, config.proxy_timeout())?;
        Ok(Self {
            state: AppState::new(collectors, proxy),
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        router(
            self.state.clone(),
            &self.config.static_dir,
            &self.config.index_page,
        )
    }

    /// Bind the listening socket
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let addr = self.config.listen_addr();
        let mut resolved = tokio::net::lookup_host(&addr)
            .await
            .map_err(|e| ServerError::InvalidAddress(format!("{}: {}", addr, e)))?;
        let socket = resolved
            .next()
            .ok_or_else(|| ServerError::InvalidAddress(addr.clone()))?;

        TcpListener::bind(socket)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })
    }

    /// Serve on `listener` until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        log::info!("Dashboard server running on port {}", self.config.port);
        log::info!("Serving files from {}", self.config.static_dir.display());
        log::info!("Proxying /api/* to {}", self.state.proxy.upstream());
        log::info!("System endpoints:");
        for endpoint in ["disk", "components", "performance", "docker"] {
            log::info!("  /api/admin/system/{}", endpoint);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)
    }
}

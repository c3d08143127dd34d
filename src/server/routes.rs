//! Router assembly and response headers

use super::{handlers, proxy, AppState};
use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Build the dashboard router
///
/// `/api/admin/system/*` is answered locally, every other `/api/*` path is
/// proxied, and anything else is a static file under `static_dir` with `/`
/// mapped to `index_page`.
pub fn router(state: AppState, static_dir: &Path, index_page: &str) -> Router {
    Router::new()
        .route("/api/admin/system/disk", get(handlers::disk))
        .route("/api/admin/system/components", get(handlers::components))
        .route("/api/admin/system/performance", get(handlers::performance))
        .route("/api/admin/system/docker", get(handlers::docker))
        .route("/api", any(proxy::forward))
        .route("/api/{*path}", any(proxy::forward))
        .route_service("/", ServeFile::new(static_dir.join(index_page)))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(dashboard_headers))
        .with_state(state)
}

/// Permissive CORS and no-cache on every response; `OPTIONS` answers 200
async fn dashboard_headers(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );

    log::info!("{} {} -> {}", method, path, response.status().as_u16());
    response
}

//! Pool API reverse proxy

use super::handlers::error_response;
use super::AppState;
use crate::error::ServerError;
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use std::time::Duration;

/// Largest request body forwarded upstream
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Upstream pool API client
#[derive(Debug, Clone)]
pub struct Proxy {
    client: reqwest::Client,
    upstream: String,
}

impl Proxy {
    pub fn new(upstream: &str, timeout: Duration) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::Client(e.to_string()))?;
        Ok(Self {
            client,
            upstream: upstream.trim_end_matches('/').to_string(),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    /// Forward a request, keeping its path and query string
    async fn forward(&self, request: Request) -> Result<Response, String> {
        let path = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.upstream, path);
        let method = request.method().clone();
        let content_type = request.headers().get(CONTENT_TYPE).cloned();

        let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| e.to_string())?;

        let mut upstream = self.client.request(method, &url);
        if let Some(ct) = content_type {
            upstream = upstream.header(CONTENT_TYPE, ct);
        }
        if !body.is_empty() {
            upstream = upstream.body(body);
        }

        let reply = upstream.send().await.map_err(|e| e.to_string())?;
        let status = reply.status();
        let content_type = reply.headers().get(CONTENT_TYPE).cloned();
        let bytes = reply.bytes().await.map_err(|e| e.to_string())?;

        let mut builder = Response::builder().status(status);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(Body::from(bytes)).map_err(|e| e.to_string())
    }
}

/// Any `/api/*` path not served locally
pub async fn forward(State(state): State<AppState>, request: Request) -> Response {
    match state.proxy.forward(request).await {
        Ok(response) => response,
        Err(e) => error_response(format!("Proxy error: {}", e)),
    }
}

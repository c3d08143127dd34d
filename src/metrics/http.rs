//! Metrics read over HTTP from the dashboard server and the pool API

use super::types::{DiskSnapshot, PerformanceReport, PerformanceSnapshot, PoolStatus};
use super::MetricsSource;
use crate::error::MetricsError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    pools: Vec<PoolEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolEntry {
    #[serde(default)]
    network_stats: Option<NetworkStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkStats {
    #[serde(default)]
    connected_peers: Option<u32>,
}

/// Reads the dashboard's `/api/admin/system/*` endpoints and the pool API
pub struct HttpMetricsSource {
    client: reqwest::Client,
    dashboard_url: String,
    pool_url: String,
    timeout: Duration,
}

impl HttpMetricsSource {
    pub fn new(dashboard_url: &str, pool_url: &str, timeout: Duration) -> Result<Self, MetricsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MetricsError::Client(e.to_string()))?;

        Ok(Self {
            client,
            dashboard_url: dashboard_url.trim_end_matches('/').to_string(),
            pool_url: pool_url.to_string(),
            timeout,
        })
    }

    fn request_error(&self, what: &str, err: reqwest::Error) -> MetricsError {
        if err.is_timeout() {
            MetricsError::Timeout {
                what: what.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            MetricsError::Request(err.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, what: &str, url: &str) -> Result<T, MetricsError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(what, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(what, e))?;
        serde_json::from_str(&body).map_err(|e| MetricsError::Parse(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn disk_usage(&self) -> Result<DiskSnapshot, MetricsError> {
        let url = format!("{}/api/admin/system/disk", self.dashboard_url);
        self.get_json("disk usage", &url).await
    }

    async fn pool_status(&self) -> PoolStatus {
        match self.client.get(&self.pool_url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => PoolStatus::Online,
            Ok(response) => PoolStatus::HttpStatus(response.status().as_u16()),
            Err(e) => PoolStatus::Unreachable(e.to_string()),
        }
    }

    async fn performance(&self) -> Result<PerformanceSnapshot, MetricsError> {
        let url = format!("{}/api/admin/system/performance", self.dashboard_url);
        let report: PerformanceReport = self.get_json("performance", &url).await?;
        Ok(report.metrics)
    }

    async fn connected_peers(&self) -> Result<u32, MetricsError> {
        let response: PoolsResponse = self.get_json("pool stats", &self.pool_url).await?;
        response
            .pools
            .first()
            .and_then(|pool| pool.network_stats.as_ref())
            .and_then(|stats| stats.connected_peers)
            .ok_or_else(|| MetricsError::Unavailable("connectedPeers".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer) -> HttpMetricsSource {
        HttpMetricsSource::new(
            &server.uri(),
            &format!("{}/api/pools", server.uri()),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_disk_usage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/system/disk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": "100.0 GB",
                "used": "92.0 GB",
                "free": "8.0 GB",
                "usagePercent": 92.0,
                "components": {"postgresql": "1.2 GB", "logs": "N/A"},
                "timestamp": "2024-01-01T12:00:00"
            })))
            .mount(&server)
            .await;

        let disk = source(&server).disk_usage().await.unwrap();
        assert_eq!(disk.usage_percent, 92.0);
        assert_eq!(disk.free, "8.0 GB");
        assert_eq!(disk.components["logs"], "N/A");
    }

    #[tokio::test]
    async fn test_disk_usage_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/system/disk"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "boom"})))
            .mount(&server)
            .await;

        let result = source(&server).disk_usage().await;
        assert_eq!(result, Err(MetricsError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_performance_unavailable_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/system/performance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "metrics": {"cpuUsage": "N/A", "memory": "N/A", "loadAverage": "N/A"},
                "timestamp": "2024-01-01T12:00:00"
            })))
            .mount(&server)
            .await;

        let perf = source(&server).performance().await.unwrap();
        assert_eq!(perf.cpu_usage, None);
        assert_eq!(perf.memory, None);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/system/performance"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = source(&server).performance().await;
        assert!(matches!(result, Err(MetricsError::Parse(_))));
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/system/disk"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let result = source(&server).disk_usage().await;
        assert!(matches!(result, Err(MetricsError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_pool_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pools"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert_eq!(source(&server).pool_status().await, PoolStatus::HttpStatus(502));
    }

    #[tokio::test]
    async fn test_pool_unreachable() {
        let source = HttpMetricsSource::new(
            "http://127.0.0.1:1",
            "http://127.0.0.1:1/api/pools",
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(matches!(source.pool_status().await, PoolStatus::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_connected_peers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pools"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pools": [{"id": "ergo1", "networkStats": {"connectedPeers": 14}}]
            })))
            .mount(&server)
            .await;

        assert_eq!(source(&server).connected_peers().await, Ok(14));
    }

    #[tokio::test]
    async fn test_missing_peer_count_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pools"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"pools": []})))
            .mount(&server)
            .await;

        assert!(matches!(
            source(&server).connected_peers().await,
            Err(MetricsError::Unavailable(_))
        ));
    }
}

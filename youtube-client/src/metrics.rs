use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub quota_exceeded_requests: u64,
    pub total_response_time: Duration,
    pub last_request_time: Option<DateTime<Utc>>,
    pub requests_by_endpoint: HashMap<String, EndpointMetrics>,
    /// Failed requests keyed by error code.
    pub errors_by_kind: HashMap<String, u64>,
    /// Requests that got an HTTP response, keyed by status code.
    pub responses_by_status: HashMap<u16, u64>,
}

impl ApiMetrics {
    pub fn average_response_time(&self) -> Duration {
        if self.total_requests == 0 {
            Duration::ZERO
        } else {
            self.total_response_time / self.total_requests as u32
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMetrics {
    pub request_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub total_response_time: Duration,
    pub min_response_time: Duration,
    pub max_response_time: Duration,
}

#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub endpoint: String,
    pub method: String,
    pub status_code: Option<u16>,
    pub response_time: Duration,
    pub success: bool,
    pub error_type: Option<String>,
}

impl EndpointMetrics {
    fn new() -> Self {
        Self {
            request_count: 0,
            success_count: 0,
            error_count: 0,
            total_response_time: Duration::ZERO,
            min_response_time: Duration::MAX,
            max_response_time: Duration::ZERO,
        }
    }

    fn update(&mut self, metrics: &RequestMetrics) {
        self.request_count += 1;
        self.total_response_time += metrics.response_time;
        self.min_response_time = self.min_response_time.min(metrics.response_time);
        self.max_response_time = self.max_response_time.max(metrics.response_time);

        if metrics.success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
        }
    }

    pub fn average_response_time(&self) -> Duration {
        if self.request_count == 0 {
            Duration::ZERO
        } else {
            self.total_response_time / self.request_count as u32
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.request_count as f64
        }
    }
}

/// In-memory counters for calls made to the YouTube API.
#[derive(Debug)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<ApiMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(ApiMetrics::default())),
        }
    }

    pub async fn record_request(&self, request_metrics: RequestMetrics) {
        debug!(
            "{} {} -> {:?} in {:?}",
            request_metrics.method,
            request_metrics.endpoint,
            request_metrics.status_code,
            request_metrics.response_time
        );
        let mut metrics = self.metrics.write().await;

        metrics.total_requests += 1;
        metrics.total_response_time += request_metrics.response_time;
        metrics.last_request_time = Some(Utc::now());

        if request_metrics.success {
            metrics.successful_requests += 1;
        } else {
            metrics.failed_requests += 1;
        }

        if let Some(status) = request_metrics.status_code {
            *metrics.responses_by_status.entry(status).or_insert(0) += 1;
        }

        if let Some(ref kind) = request_metrics.error_type {
            if kind == "YOUTUBE_QUOTA_EXCEEDED" {
                metrics.quota_exceeded_requests += 1;
            }
            *metrics.errors_by_kind.entry(kind.clone()).or_insert(0) += 1;
        }

        metrics
            .requests_by_endpoint
            .entry(request_metrics.endpoint.clone())
            .or_insert_with(EndpointMetrics::new)
            .update(&request_metrics);
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.read().await.clone()
    }

    pub async fn get_endpoint_metrics(&self, endpoint: &str) -> Option<EndpointMetrics> {
        let metrics = self.metrics.read().await;
        metrics.requests_by_endpoint.get(endpoint).cloned()
    }

    pub async fn reset_metrics(&self) {
        let mut metrics = self.metrics.write().await;
        *metrics = ApiMetrics::default();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(endpoint: &str, millis: u64, error_type: Option<&str>) -> RequestMetrics {
        RequestMetrics {
            endpoint: endpoint.to_string(),
            method: "GET".to_string(),
            status_code: Some(if error_type.is_some() { 403 } else { 200 }),
            response_time: Duration::from_millis(millis),
            success: error_type.is_none(),
            error_type: error_type.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_metrics_collection() {
        let collector = MetricsCollector::new();
        collector.record_request(request("/commentThreads", 150, None)).await;
        collector
            .record_request(request("/commentThreads", 50, Some("YOUTUBE_QUOTA_EXCEEDED")))
            .await;

        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.failed_requests, 1);
        assert_eq!(metrics.quota_exceeded_requests, 1);
        assert_eq!(metrics.errors_by_kind.get("YOUTUBE_QUOTA_EXCEEDED"), Some(&1));
        assert_eq!(metrics.responses_by_status.get(&200), Some(&1));
        assert_eq!(metrics.responses_by_status.get(&403), Some(&1));
        assert_eq!(metrics.average_response_time(), Duration::from_millis(100));
        assert!(metrics.last_request_time.is_some());
    }

    #[tokio::test]
    async fn test_endpoint_metrics() {
        let collector = MetricsCollector::new();
        collector.record_request(request("/search", 100, None)).await;
        collector.record_request(request("/search", 300, None)).await;

        let metrics = collector.get_endpoint_metrics("/search").await.unwrap();
        assert_eq!(metrics.request_count, 2);
        assert_eq!(metrics.success_rate(), 1.0);
        assert_eq!(metrics.min_response_time, Duration::from_millis(100));
        assert_eq!(metrics.max_response_time, Duration::from_millis(300));
        assert_eq!(metrics.average_response_time(), Duration::from_millis(200));

        assert!(collector.get_endpoint_metrics("/channels").await.is_none());
    }

    #[tokio::test]
    async fn test_transport_failures_have_no_status() {
        let collector = MetricsCollector::new();
        let mut failed = request("/channels", 30, Some("NETWORK"));
        failed.status_code = None;
        collector.record_request(failed).await;

        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.failed_requests, 1);
        assert!(metrics.responses_by_status.is_empty());
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let collector = MetricsCollector::new();
        collector.record_request(request("/channels", 10, None)).await;
        collector.reset_metrics().await;
        assert_eq!(collector.get_metrics().await.total_requests, 0);
    }
}

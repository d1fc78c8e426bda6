use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Aggregate counters for every request a session has made.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub rate_limited_requests: u64,
    pub total_response_time: Duration,
    pub max_response_time: Duration,
}

/// One completed (or failed) HTTP exchange.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub status_code: Option<u16>,
    pub response_time: Duration,
    pub success: bool,
}

impl RequestMetrics {
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == Some(429)
    }
}

impl ApiMetrics {
    pub fn average_response_time(&self) -> Duration {
        if self.total_requests == 0 {
            Duration::ZERO
        } else {
            self.total_response_time / self.total_requests as u32
        }
    }

    /// One-line summary for the operator log.
    pub fn summary(&self) -> String {
        format!(
            "{} requests ({} ok, {} failed, {} rate limited), avg {:?}, max {:?}",
            self.total_requests,
            self.successful_requests,
            self.failed_requests,
            self.rate_limited_requests,
            self.average_response_time(),
            self.max_response_time
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<ApiMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_request(&self, request_metrics: RequestMetrics) {
        let mut metrics = self.metrics.write().await;

        metrics.total_requests += 1;
        metrics.total_response_time += request_metrics.response_time;
        metrics.max_response_time = metrics.max_response_time.max(request_metrics.response_time);

        if request_metrics.success {
            metrics.successful_requests += 1;
        } else {
            metrics.failed_requests += 1;
        }

        if request_metrics.is_rate_limited() {
            metrics.rate_limited_requests += 1;
        }
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(millis: u64, status_code: Option<u16>) -> RequestMetrics {
        RequestMetrics {
            status_code,
            response_time: Duration::from_millis(millis),
            success: matches!(status_code, Some(code) if code < 400),
        }
    }

    #[tokio::test]
    async fn test_metrics_collection() {
        let collector = MetricsCollector::new();

        collector.record_request(request(100, Some(200))).await;
        collector.record_request(request(300, Some(429))).await;
        collector.record_request(request(200, None)).await;

        let metrics = collector.get_metrics().await;
        assert_eq!(metrics.total_requests, 3);
        assert_eq!(metrics.successful_requests, 1);
        assert_eq!(metrics.failed_requests, 2);
        assert_eq!(metrics.rate_limited_requests, 1);
        assert_eq!(metrics.average_response_time(), Duration::from_millis(200));
        assert_eq!(metrics.max_response_time, Duration::from_millis(300));
        assert!(metrics
            .summary()
            .starts_with("3 requests (1 ok, 2 failed, 1 rate limited)"));
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = ApiMetrics::default();
        assert_eq!(metrics.average_response_time(), Duration::ZERO);
        assert!(metrics.summary().starts_with("0 requests"));
    }
}

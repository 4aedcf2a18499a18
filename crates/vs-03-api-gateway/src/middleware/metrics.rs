//! Request metrics, served as JSON on `/metrics`.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// API Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_client_error: AtomicU64,
    pub requests_server_error: AtomicU64,

    // Write request counters (POST /contract, POST /payment)
    pub write_requests_total: AtomicU64,

    // Requests currently being handled
    pub in_flight: AtomicU64,

    // Latency tracking (simplified, no histogram)
    pub total_latency_ms: AtomicU64,
    pub max_latency_ms: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request
    pub fn record_request(&self, status: u16, is_write: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        match status {
            500..=599 => self.requests_server_error.fetch_add(1, Ordering::Relaxed),
            400..=499 => self.requests_client_error.fetch_add(1, Ordering::Relaxed),
            _ => self.requests_success.fetch_add(1, Ordering::Relaxed),
        };

        if is_write {
            self.write_requests_total.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.max_latency_ms.fetch_max(latency_ms, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "clientError": self.requests_client_error.load(Ordering::Relaxed),
                "serverError": self.requests_server_error.load(Ordering::Relaxed),
                "writes": self.write_requests_total.load(Ordering::Relaxed),
                "inFlight": self.in_flight.load(Ordering::Relaxed),
            },
            "latency": {
                "averageMs": self.average_latency_ms(),
                "maxMs": self.max_latency_ms.load(Ordering::Relaxed),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
    is_write: bool,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>, is_write: bool) -> Self {
        metrics.in_flight.fetch_add(1, Ordering::Relaxed);
        Self {
            start: Instant::now(),
            metrics,
            is_write,
        }
    }

    pub fn finish(self, status: u16) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.metrics
            .record_request(status, self.is_write, latency_ms);
    }
}

/// `axum::middleware::from_fn_with_state` hook timing every request.
pub async fn track_metrics(
    State(metrics): State<Arc<GatewayMetrics>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let timer = RequestTimer::new(metrics, req.method() == Method::POST);
    let response = next.run(req).await;
    timer.finish(response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = GatewayMetrics::new();

        metrics.record_request(200, false, 100);
        metrics.record_request(409, true, 200);
        metrics.record_request(503, true, 50);

        assert_eq!(metrics.requests_total.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.requests_success.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_client_error.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_server_error.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.write_requests_total.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.max_latency_ms.load(Ordering::Relaxed), 200);
    }

    #[test]
    fn test_average_latency() {
        let metrics = GatewayMetrics::new();

        metrics.record_request(200, false, 100);
        metrics.record_request(200, false, 200);
        metrics.record_request(200, false, 300);

        assert!((metrics.average_latency_ms() - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_timer_tracks_in_flight() {
        let metrics = Arc::new(GatewayMetrics::new());
        let timer = RequestTimer::new(Arc::clone(&metrics), true);
        assert_eq!(metrics.in_flight.load(Ordering::Relaxed), 1);

        timer.finish(200);
        assert_eq!(metrics.in_flight.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.write_requests_total.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_json_export() {
        let metrics = GatewayMetrics::new();
        metrics.record_request(200, false, 100);

        let json = metrics.to_json();
        assert_eq!(json["requests"]["total"], 1);
        assert_eq!(json["requests"]["success"], 1);
    }
}

//! Timeout middleware.
//!
//! Bounds every request with a whole-exchange time limit. `POST` routes
//! submit transactions and wait for mining, so they get the longer `write`
//! limit. Expiry yields a structured 504.

use crate::domain::config::TimeoutConfig;
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tower::{Layer, Service};
use tracing::warn;

/// Timeout layer
#[derive(Clone)]
pub struct TimeoutLayer {
    config: Arc<TimeoutConfig>,
}

impl TimeoutLayer {
    pub fn new(config: TimeoutConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

#[derive(Clone)]
pub struct TimeoutService<S> {
    inner: S,
    config: Arc<TimeoutConfig>,
}

impl<S> Service<Request<Body>> for TimeoutService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let limit = timeout_for_request(&req, &config);
            let path = req.uri().path().to_string();

            match timeout(limit, inner.call(req)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(path = %path, timeout_ms = limit.as_millis() as u64, "Request timed out");
                    Ok(ApiError::timeout(limit).into_response())
                }
            }
        })
    }
}

fn timeout_for_request<B>(req: &Request<B>, config: &TimeoutConfig) -> Duration {
    if req.method() == Method::POST {
        config.write
    } else {
        config.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[test]
    fn test_default_timeout() {
        let config = TimeoutConfig::default();
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(timeout_for_request(&req, &config), config.default);
    }

    #[test]
    fn test_write_timeout_for_post() {
        let config = TimeoutConfig::default();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/contract")
            .body(Body::empty())
            .unwrap();
        assert_eq!(timeout_for_request(&req, &config), config.write);
    }

    #[tokio::test]
    async fn test_slow_handler_gets_structured_504() {
        let config = TimeoutConfig {
            default: Duration::from_millis(20),
            write: Duration::from_millis(20),
        };
        let app = Router::new()
            .route(
                "/init",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "late"
                }),
            )
            .layer(TimeoutLayer::new(config));

        let response = app
            .oneshot(Request::builder().uri("/init").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "RequestTimeout");
    }
}

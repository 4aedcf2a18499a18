//! Middleware stack for the gateway.
//!
//! Layer order, outermost first:
//! Request → CORS → Tracing → Metrics → Timeout → BodyLimit → Handler

pub mod cors;
pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use cors::create_cors_layer;
pub use metrics::{track_metrics, GatewayMetrics, RequestTimer};
pub use timeout::TimeoutLayer;
pub use tracing::{TracingLayer, REQUEST_ID_HEADER};

//! # API Gateway
//!
//! HTTP interface of the vehicle sale node: three JSON routes driving the
//! sale workflow, a session view, health and metrics, and the browser UI
//! served from a static directory.
//!
//! ```text
//!  browser ──▶ CORS → Tracing → Metrics → Timeout → BodyLimit
//!                                                      │
//!                     ┌────────────────────────────────┴──────┐
//!                     ▼                                       ▼
//!        /init /contract /payment /sessions        static content dir
//!                     │
//!                     ▼
//!              SaleWorkflowApi
//! ```
//!
//! Every error response has the shape
//! `{"error": {"code": "<Kind>", "message": "..."}}`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::config::{CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, StaticConfig, TimeoutConfig};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use middleware::GatewayMetrics;
pub use router::{build_router, AppState};
pub use service::GatewayService;

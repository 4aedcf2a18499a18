//! Gateway domain: configuration, errors and HTTP bodies.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, StaticConfig, TimeoutConfig};
pub use error::{ApiError, ApiResult, GatewayError};
pub use types::*;

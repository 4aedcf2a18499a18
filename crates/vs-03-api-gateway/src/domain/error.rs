//! Gateway error types and their HTTP representation.
//!
//! Every failure leaves the gateway as a non-2xx status with the body
//! `{"error": {"code": "<Kind>", "message": "..."}}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shared_types::ParseError;
use std::fmt;
use vs_02_sale_workflow::SaleError;

/// Error codes exposed to HTTP callers.
pub mod codes {
    pub const INVALID_REQUEST: &str = "InvalidRequest";
    pub const NOT_FOUND: &str = "NotFound";
    pub const INTERNAL: &str = "Internal";
    pub const REQUEST_TIMEOUT: &str = "RequestTimeout";
}

/// An error on its way to an HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Malformed or semantically invalid request body.
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::INVALID_REQUEST, details)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            format!("not found: {}", resource.into()),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL, details)
    }

    /// The whole request exceeded the gateway's time limit.
    pub fn timeout(limit: std::time::Duration) -> Self {
        Self::new(
            StatusCode::GATEWAY_TIMEOUT,
            codes::REQUEST_TIMEOUT,
            format!("request exceeded {}ms", limit.as_millis()),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.status.as_u16(), self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SaleError> for ApiError {
    fn from(e: SaleError) -> Self {
        let status = match &e {
            SaleError::AccountUnlockFailed { .. } => StatusCode::FORBIDDEN,
            SaleError::InvalidPhaseTransition { .. }
            | SaleError::AddressMismatch { .. }
            | SaleError::PriceMismatch { .. } => StatusCode::CONFLICT,
            SaleError::DeploymentFailed(_) | SaleError::PaymentFailed(_) => StatusCode::BAD_GATEWAY,
            SaleError::ChainUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SaleError::ChainTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            SaleError::InvalidSession(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.code(), e.to_string())
    }
}

// Body rejections keep axum's status (400, 413, 415, 422) but always carry
// the structured body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            other => other,
        };
        Self::new(status, codes::INVALID_REQUEST, rejection.body_text())
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        ApiError::invalid_request(e.to_string())
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and serving, never sent to callers)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    #[error("server bind error: {0}")]
    Bind(String),

    #[error("server error: {0}")]
    Server(String),
}

//! # Error Types
//!
//! Parse failures for the shared primitives.

use thiserror::Error;

/// Errors raised when parsing primitives from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The value is not a valid 20-byte hex address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The value is not a valid wei amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The value is not a valid 32-byte hex hash.
    #[error("Invalid hash: {0}")]
    InvalidHash(String),
}

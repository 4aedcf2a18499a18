//! Error types for the sale workflow subsystem.

use shared_types::{format_address, Address, Wei};
use thiserror::Error;

use crate::domain::session::SalePhase;

/// Failures of a sale workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    /// The node could not be reached or answered unusably.
    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),

    /// The node refused to unlock an account.
    #[error("failed to unlock account {}: {reason}", format_address(.account))]
    AccountUnlockFailed { account: Address, reason: String },

    /// Contract creation was rejected or did not produce a contract.
    #[error("contract deployment failed: {0}")]
    DeploymentFailed(String),

    /// The purchase transaction was rejected or reverted.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// The session is not in the phase the operation requires.
    #[error("invalid phase transition: expected {expected}, found {}", describe_phase(.actual))]
    InvalidPhaseTransition {
        expected: SalePhase,
        actual: Option<SalePhase>,
    },

    /// A request address differs from the one recorded in the session.
    #[error(
        "{field} mismatch: session has {}, request has {}",
        format_address(.expected),
        format_address(.actual)
    )]
    AddressMismatch {
        field: &'static str,
        expected: Address,
        actual: Address,
    },

    /// The request price differs from the session price.
    #[error("price mismatch: session has {expected} wei, request has {actual} wei")]
    PriceMismatch { expected: Wei, actual: Wei },

    /// A chain call did not finish within its time limit.
    #[error("{operation} timed out after {elapsed_ms}ms")]
    ChainTimeout {
        operation: &'static str,
        elapsed_ms: u64,
    },

    /// The session terms are invalid (equal parties, zero price, empty id).
    #[error("invalid session: {0}")]
    InvalidSession(String),
}

fn describe_phase(phase: &Option<SalePhase>) -> String {
    match phase {
        Some(phase) => phase.to_string(),
        None => "no session".to_string(),
    }
}

impl SaleError {
    /// Stable kind name, used as the error code at the HTTP boundary.
    pub fn code(&self) -> &'static str {
        match self {
            SaleError::ChainUnavailable(_) => "ChainUnavailable",
            SaleError::AccountUnlockFailed { .. } => "AccountUnlockFailed",
            SaleError::DeploymentFailed(_) => "DeploymentFailed",
            SaleError::PaymentFailed(_) => "PaymentFailed",
            SaleError::InvalidPhaseTransition { .. } => "InvalidPhaseTransition",
            SaleError::AddressMismatch { .. } => "AddressMismatch",
            SaleError::PriceMismatch { .. } => "PriceMismatch",
            SaleError::ChainTimeout { .. } => "ChainTimeout",
            SaleError::InvalidSession(_) => "InvalidSession",
        }
    }
}

/// Invalid workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

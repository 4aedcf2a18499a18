//! Error types for the chain client subsystem.

use thiserror::Error;

/// Errors returned by a [`crate::ports::outbound::ChainClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// The node could not be reached or the HTTP exchange failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something that could not be decoded.
    #[error("failed to decode node response: {0}")]
    Decode(String),

    /// The transaction was mined but its status is failure.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// ABI encoding or decoding failed.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// A referenced contract, method or event does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ChainError {
    /// True when the failure says nothing about the request itself,
    /// only that the node was unreachable or spoke garbage.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChainError::Transport(_) | ChainError::Decode(_))
    }
}

/// ABI codec failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("unsupported ABI type: {0}")]
    UnsupportedType(String),

    #[error("argument mismatch for {context}: {reason}")]
    ArgumentMismatch { context: String, reason: String },

    #[error("unknown {kind}: {name}")]
    UnknownItem { kind: &'static str, name: String },

    #[error("invalid ABI data: {0}")]
    InvalidData(String),

    #[error("invalid contract artifact: {0}")]
    InvalidArtifact(String),
}

/// Result alias for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

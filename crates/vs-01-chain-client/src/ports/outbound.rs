//! # Driven Ports (SPI - Outbound)
//!
//! The interface the sale workflow depends on to reach an
//! Ethereum-compatible node. Adapters implement this trait:
//! - [`crate::adapters::JsonRpcChainClient`] talks HTTP JSON-RPC to a real node
//! - [`crate::adapters::InMemoryChain`] simulates the sale contract for tests
//!   and development
//!
//! ## Contract
//!
//! - `deploy` and `invoke` return only after the transaction is mined.
//!   A mined transaction with failure status is [`ChainError::Reverted`].
//! - Implementations never retry on their own; callers bound every call
//!   with their own timeout.

use async_trait::async_trait;
use shared_types::{Address, Wei};
use std::time::Duration;

use crate::domain::entities::{
    DeployRequest, Deployment, EventQuery, EventRecord, InvokeRequest, Receipt,
};
use crate::errors::ChainError;

// =============================================================================
// CHAIN ACCESS
// =============================================================================

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Accounts managed by the node, in node order.
    async fn accounts(&self) -> Result<Vec<Address>, ChainError>;

    /// Latest balance of `address`.
    async fn balance(&self, address: Address) -> Result<Wei, ChainError>;

    /// Unlock a node-managed account for `duration`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - the account is unlocked
    /// * `Ok(false)` - the node refused (typically a wrong passphrase)
    async fn unlock(
        &self,
        address: Address,
        passphrase: &str,
        duration: Duration,
    ) -> Result<bool, ChainError>;

    /// Create a contract and wait until the creation is mined.
    async fn deploy(&self, request: DeployRequest) -> Result<Deployment, ChainError>;

    /// Send a transaction to a contract method and wait until it is mined.
    async fn invoke(&self, request: InvokeRequest) -> Result<Receipt, ChainError>;

    /// Past logs matching the query, oldest first.
    async fn past_events(&self, query: EventQuery) -> Result<Vec<EventRecord>, ChainError>;
}

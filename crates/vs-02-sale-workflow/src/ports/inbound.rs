//! # Driving Ports (API - Inbound)
//!
//! The interface the HTTP gateway uses to drive a sale. Implemented by
//! [`crate::service::SaleWorkflowService`].

use async_trait::async_trait;
use shared_types::Address;

use crate::domain::{
    DeployOrder, DeploymentResult, SaleSession, SessionSnapshot, SettlementResult, WorkflowStats,
};
use crate::errors::SaleError;

// =============================================================================
// SALE WORKFLOW
// =============================================================================

#[async_trait]
pub trait SaleWorkflowApi: Send + Sync {
    /// Start (or restart) the configured vehicle's sale in `Created`.
    ///
    /// Reads the buyer and dealer accounts and balances from the node.
    /// Any previous session for the vehicle is replaced once its in-flight
    /// operation, if any, has finished.
    async fn initialize(&self) -> Result<SessionSnapshot, SaleError>;

    /// Deploy the sale contract for a `Created` session.
    ///
    /// The order must repeat the session's buyer, dealer and price.
    async fn deploy_contract(&self, order: DeployOrder) -> Result<DeploymentResult, SaleError>;

    /// Pay for the vehicle through the contract at `contract_address`.
    async fn submit_payment(&self, contract_address: Address)
        -> Result<SettlementResult, SaleError>;

    /// Current session of a vehicle, if any.
    async fn session(&self, vehicle_id: &str) -> Option<SaleSession>;

    /// Operation counters.
    async fn stats(&self) -> WorkflowStats;
}

//! Inputs and outputs of the workflow operations.

use serde::Serialize;
use shared_types::{Address, Wei};
use vs_01_chain_client::EventRecord;

/// Result of `initialize`: the sale terms plus both balances in wei.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub vehicle_id: String,
    pub price: Wei,
    pub buyer: Address,
    pub dealer: Address,
    pub buyer_balance: Wei,
    pub dealer_balance: Wei,
}

/// Terms a dealer submits when deploying the sale contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOrder {
    pub vehicle_id: String,
    pub price: Wei,
    pub buyer: Address,
    pub dealer: Address,
}

/// Result of `deploy_contract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub vehicle_id: String,
    pub price: Wei,
    pub buyer: Address,
    pub dealer: Address,
    pub contract_address: Address,
}

/// Result of `submit_payment`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    pub events: Vec<EventRecord>,
    pub buyer_balance: Wei,
    pub dealer_balance: Wei,
}

/// Counters kept by the workflow service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStats {
    pub sessions_initialized: u64,
    pub contracts_deployed: u64,
    pub payments_settled: u64,
    pub failed_operations: u64,
    pub chain_timeouts: u64,
}

//! Request and response bodies of the HTTP routes.
//!
//! Addresses travel as full `0x`-prefixed hex, prices as decimal wei strings
//! and balances as decimal ether strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{format_address, parse_address, Wei};
use vs_01_chain_client::EventRecord;
use vs_02_sale_workflow::{
    DeployOrder, DeploymentResult, SalePhase, SaleSession, SessionSnapshot, SettlementResult,
};

use super::error::ApiError;

/// `POST /contract` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
    pub vehicle_id: String,
    /// Decimal or `0x` hex string, or a JSON integer. Integers past 2^53
    /// only survive a browser round trip as strings.
    pub price: Wei,
    pub buyer: String,
    pub dealer: String,
}

impl ContractRequest {
    pub fn into_order(self) -> Result<DeployOrder, ApiError> {
        if self.vehicle_id.trim().is_empty() {
            return Err(ApiError::invalid_request("vehicleId must not be empty"));
        }
        Ok(DeployOrder {
            vehicle_id: self.vehicle_id,
            price: self.price,
            buyer: parse_address(&self.buyer)?,
            dealer: parse_address(&self.dealer)?,
        })
    }
}

/// `POST /payment` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub contract_address: String,
}

/// `GET /init` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub vehicle_id: String,
    pub price: Wei,
    pub buyer: String,
    pub dealer: String,
    pub buyer_balance: String,
    pub dealer_balance: String,
}

impl From<SessionSnapshot> for InitResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            vehicle_id: snapshot.vehicle_id,
            price: snapshot.price,
            buyer: format_address(&snapshot.buyer),
            dealer: format_address(&snapshot.dealer),
            buyer_balance: snapshot.buyer_balance.format_ether(),
            dealer_balance: snapshot.dealer_balance.format_ether(),
        }
    }
}

/// `POST /contract` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractResponse {
    pub vehicle_id: String,
    pub price: Wei,
    pub buyer: String,
    pub dealer: String,
    pub contract_address: String,
}

impl From<DeploymentResult> for ContractResponse {
    fn from(result: DeploymentResult) -> Self {
        Self {
            vehicle_id: result.vehicle_id,
            price: result.price,
            buyer: format_address(&result.buyer),
            dealer: format_address(&result.dealer),
            contract_address: format_address(&result.contract_address),
        }
    }
}

/// `POST /payment` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub events: Vec<EventRecord>,
    pub buyer_balance: String,
    pub dealer_balance: String,
}

impl From<SettlementResult> for PaymentResponse {
    fn from(result: SettlementResult) -> Self {
        Self {
            events: result.events,
            buyer_balance: result.buyer_balance.format_ether(),
            dealer_balance: result.dealer_balance.format_ether(),
        }
    }
}

/// `GET /sessions/:vehicle_id` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub vehicle_id: String,
    pub price: Wei,
    pub buyer: String,
    pub dealer: String,
    pub phase: SalePhase,
    pub contract_address: Option<String>,
    pub events: Vec<EventRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SaleSession> for SessionView {
    fn from(session: &SaleSession) -> Self {
        Self {
            session_id: session.session_id().to_string(),
            vehicle_id: session.vehicle_id().to_string(),
            price: session.price(),
            buyer: format_address(&session.buyer()),
            dealer: format_address(&session.dealer()),
            phase: session.phase(),
            contract_address: session.contract_address().map(|a| format_address(&a)),
            events: session.events().to_vec(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
}

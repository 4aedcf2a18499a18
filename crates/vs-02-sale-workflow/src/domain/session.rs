//! # Sale Session State Machine
//!
//! ```text
//! (none) ──initialize──▶ Created ──deploy confirmed──▶ ContractDeployed
//!                                                          │
//!                                   payment confirmed      ▼
//!                                                   PaymentSettled
//! ```
//!
//! Transitions only move forward and each fires at most once. The contract
//! address is present exactly when the phase is past `Created`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{Address, Wei};
use std::fmt;
use uuid::Uuid;
use vs_01_chain_client::EventRecord;

use crate::errors::SaleError;

/// Workflow phase of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SalePhase {
    Created,
    ContractDeployed,
    PaymentSettled,
}

impl fmt::Display for SalePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SalePhase::Created => "Created",
            SalePhase::ContractDeployed => "ContractDeployed",
            SalePhase::PaymentSettled => "PaymentSettled",
        };
        f.write_str(name)
    }
}

/// One in-progress vehicle sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSession {
    session_id: Uuid,
    vehicle_id: String,
    price: Wei,
    buyer: Address,
    dealer: Address,
    phase: SalePhase,
    contract_address: Option<Address>,
    events: Vec<EventRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleSession {
    /// Start a sale in `Created`.
    pub fn new(
        vehicle_id: impl Into<String>,
        price: Wei,
        buyer: Address,
        dealer: Address,
    ) -> Result<Self, SaleError> {
        let vehicle_id = vehicle_id.into();
        if vehicle_id.trim().is_empty() {
            return Err(SaleError::InvalidSession("vehicle id is empty".into()));
        }
        if price.is_zero() {
            return Err(SaleError::InvalidSession("price must be positive".into()));
        }
        if buyer == dealer {
            return Err(SaleError::InvalidSession(
                "buyer and dealer must be different accounts".into(),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            session_id: Uuid::new_v4(),
            vehicle_id,
            price,
            buyer,
            dealer,
            phase: SalePhase::Created,
            contract_address: None,
            events: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn price(&self) -> Wei {
        self.price
    }

    pub fn buyer(&self) -> Address {
        self.buyer
    }

    pub fn dealer(&self) -> Address {
        self.dealer
    }

    pub fn phase(&self) -> SalePhase {
        self.phase
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.contract_address
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn ensure_phase(&self, expected: SalePhase) -> Result<(), SaleError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SaleError::InvalidPhaseTransition {
                expected,
                actual: Some(self.phase),
            })
        }
    }

    /// Check a deploy request against the fixed terms of the sale.
    pub fn verify_terms(&self, price: Wei, buyer: Address, dealer: Address) -> Result<(), SaleError> {
        if buyer != self.buyer {
            return Err(SaleError::AddressMismatch {
                field: "buyer",
                expected: self.buyer,
                actual: buyer,
            });
        }
        if dealer != self.dealer {
            return Err(SaleError::AddressMismatch {
                field: "dealer",
                expected: self.dealer,
                actual: dealer,
            });
        }
        if price != self.price {
            return Err(SaleError::PriceMismatch {
                expected: self.price,
                actual: price,
            });
        }
        Ok(())
    }

    /// `Created → ContractDeployed`.
    pub fn record_deployment(&mut self, contract_address: Address) -> Result<(), SaleError> {
        self.ensure_phase(SalePhase::Created)?;
        self.contract_address = Some(contract_address);
        self.advance(SalePhase::ContractDeployed);
        Ok(())
    }

    /// `ContractDeployed → PaymentSettled`.
    pub fn record_settlement(&mut self) -> Result<(), SaleError> {
        self.ensure_phase(SalePhase::ContractDeployed)?;
        self.advance(SalePhase::PaymentSettled);
        Ok(())
    }

    /// Attach the purchase events read after settlement.
    pub fn record_events(&mut self, events: Vec<EventRecord>) -> Result<(), SaleError> {
        self.ensure_phase(SalePhase::PaymentSettled)?;
        self.events = events;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn advance(&mut self, next: SalePhase) {
        self.phase = next;
        self.updated_at = Utc::now();
    }
}

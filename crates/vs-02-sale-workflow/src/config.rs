//! Workflow configuration.

use serde::{Deserialize, Serialize};
use shared_types::serde_helpers::duration_str;
use shared_types::Wei;
use std::time::Duration;

use crate::errors::ConfigError;

/// Which purchase events `submit_payment` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    /// Only logs of the purchase transaction, read from its block.
    #[default]
    Transaction,
    /// Every purchase log the contract ever emitted.
    FullHistory,
}

/// Sale workflow configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Vehicle sold by `initialize`.
    pub vehicle_id: String,
    /// Sale price in wei.
    pub price: Wei,
    /// Index of the buyer in the node's account list.
    pub buyer_index: usize,
    /// Index of the dealer in the node's account list.
    pub dealer_index: usize,
    pub buyer_passphrase: String,
    pub dealer_passphrase: String,
    #[serde(with = "duration_str")]
    pub unlock_duration: Duration,
    /// Gas limit for deploy and purchase transactions.
    pub gas_limit: u64,
    pub purchase_method: String,
    pub purchase_event: String,
    pub event_scope: EventScope,
    pub timeouts: TimeoutConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            vehicle_id: "1234567890".to_string(),
            price: Wei::from_ether(1),
            buyer_index: 1,
            dealer_index: 2,
            buyer_passphrase: "buyer".to_string(),
            dealer_passphrase: "dealer".to_string(),
            unlock_duration: Duration::from_secs(300),
            gas_limit: 1_000_000,
            purchase_method: "buyVehicle".to_string(),
            purchase_event: "Bought".to_string(),
            event_scope: EventScope::Transaction,
            timeouts: TimeoutConfig::default(),
        }
    }
}

// Passphrases stay out of logs.
impl std::fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("vehicle_id", &self.vehicle_id)
            .field("price", &self.price)
            .field("buyer_index", &self.buyer_index)
            .field("dealer_index", &self.dealer_index)
            .field("unlock_duration", &self.unlock_duration)
            .field("gas_limit", &self.gas_limit)
            .field("purchase_method", &self.purchase_method)
            .field("purchase_event", &self.purchase_event)
            .field("event_scope", &self.event_scope)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

/// Time limits for chain calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Reads and unlocks.
    #[serde(with = "duration_str")]
    pub chain_call: Duration,
    /// Deploy and invoke, which wait for mining.
    #[serde(with = "duration_str")]
    pub confirmation: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            chain_call: Duration::from_secs(10),
            confirmation: Duration::from_secs(120),
        }
    }
}

impl WorkflowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &str) -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            })
        }

        if self.vehicle_id.trim().is_empty() {
            return invalid("vehicle_id", "must not be empty");
        }
        if self.price.is_zero() {
            return invalid("price", "must be greater than zero");
        }
        if self.buyer_index == self.dealer_index {
            return invalid("dealer_index", "buyer and dealer must be different accounts");
        }
        if self.gas_limit < 21_000 {
            return invalid("gas_limit", "must be at least 21000");
        }
        if self.unlock_duration.is_zero() {
            return invalid("unlock_duration", "must be greater than zero");
        }
        if self.purchase_method.is_empty() {
            return invalid("purchase_method", "must not be empty");
        }
        if self.purchase_event.is_empty() {
            return invalid("purchase_event", "must not be empty");
        }
        if self.timeouts.chain_call.is_zero() || self.timeouts.confirmation.is_zero() {
            return invalid("timeouts", "must be greater than zero");
        }
        if self.timeouts.confirmation < self.timeouts.chain_call {
            return invalid("timeouts.confirmation", "must not be shorter than chain_call");
        }
        Ok(())
    }
}

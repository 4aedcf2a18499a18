//! In-memory chain simulating the vehicle sale contract.
//!
//! Used by tests and by the node's development mode. Deployed contracts
//! follow the sale contract's rules: constructor `(vin, cost, buyer)`, a
//! payable purchase method that only the buyer may call with exactly the
//! price, and one purchase event per successful call. Gas is not charged,
//! so balances move by exactly the transferred value.
//!
//! Failures and latency can be scripted per operation to exercise the
//! workflow's error and timeout paths.

use alloy_primitives::keccak256;
use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::H256;
use shared_types::{format_address, Address, TxHash, Wei};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::abi::{ContractAbi, Token};
use crate::domain::entities::{
    DeployRequest, Deployment, EventQuery, EventRecord, InvokeRequest, Receipt,
};
use crate::errors::ChainError;
use crate::ports::outbound::ChainClient;

/// Gas reported for every mined call.
const SIMULATED_GAS_USED: u64 = 45_000;
const INTRINSIC_GAS: u64 = 21_000;

/// Port operations that can be scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainOperation {
    Accounts,
    Balance,
    Unlock,
    Deploy,
    Invoke,
    PastEvents,
}

#[derive(Debug)]
struct SaleContract {
    deployer: Address,
    vehicle_id: String,
    price: Wei,
    buyer: Address,
    sold: bool,
    abi: Arc<ContractAbi>,
}

#[derive(Debug, Default)]
struct ChainState {
    accounts: Vec<Address>,
    balances: HashMap<Address, Wei>,
    passphrases: HashMap<Address, String>,
    unlocked_until: HashMap<Address, Instant>,
    contracts: HashMap<Address, SaleContract>,
    logs: Vec<EventRecord>,
    block_number: u64,
    nonce: u64,
    next_contract: Option<Address>,
    failures: HashMap<ChainOperation, ChainError>,
    delays: HashMap<ChainOperation, Duration>,
    calls: HashMap<ChainOperation, usize>,
}

impl ChainState {
    fn require_unlocked(&self, account: Address) -> Result<(), ChainError> {
        match self.unlocked_until.get(&account) {
            Some(until) if Instant::now() < *until => Ok(()),
            _ => Err(ChainError::Rpc {
                code: -32000,
                message: "authentication needed: password or unlock".to_string(),
            }),
        }
    }

    fn next_tx_hash(&mut self, from: Address) -> TxHash {
        self.nonce += 1;
        let mut seed = from.as_bytes().to_vec();
        seed.extend_from_slice(&self.nonce.to_be_bytes());
        H256(keccak256(&seed).0)
    }
}

/// Scriptable in-memory [`ChainClient`].
pub struct InMemoryChain {
    state: Mutex<ChainState>,
    purchase_method: String,
    purchase_event: String,
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::with_contract_names("buyVehicle", "Bought")
    }

    /// Simulate a sale contract whose purchase method and event carry
    /// other names.
    pub fn with_contract_names(method: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(ChainState::default()),
            purchase_method: method.into(),
            purchase_event: event.into(),
        }
    }

    /// Register a node-managed account.
    pub fn add_account(&self, address: Address, balance: Wei, passphrase: &str) {
        let mut state = self.state.lock();
        state.accounts.push(address);
        state.balances.insert(address, balance);
        state.passphrases.insert(address, passphrase.to_string());
    }

    /// Register `count` accounts at deterministic addresses, all sharing
    /// one balance. Passphrases are given per index; missing ones are empty.
    pub fn with_funded_accounts(count: usize, balance: Wei, passphrases: &[&str]) -> Self {
        let chain = Self::new();
        for index in 0..count {
            let address = Address::from_low_u64_be(0xa000 + index as u64);
            chain.add_account(address, balance, passphrases.get(index).copied().unwrap_or(""));
        }
        chain
    }

    pub fn set_balance(&self, address: Address, balance: Wei) {
        self.state.lock().balances.insert(address, balance);
    }

    /// Address the next deployment lands at.
    pub fn set_next_contract_address(&self, address: Address) {
        self.state.lock().next_contract = Some(address);
    }

    /// Fail the next call of `operation` with `error`.
    pub fn fail_next(&self, operation: ChainOperation, error: ChainError) {
        self.state.lock().failures.insert(operation, error);
    }

    /// Delay every call of `operation` by `delay`.
    pub fn set_delay(&self, operation: ChainOperation, delay: Duration) {
        self.state.lock().delays.insert(operation, delay);
    }

    /// Number of calls received for `operation`, scripted failures included.
    pub fn calls(&self, operation: ChainOperation) -> usize {
        self.state.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    /// Vehicle id and sold flag of a deployed contract.
    pub fn contract_state(&self, address: Address) -> Option<(String, bool)> {
        self.state
            .lock()
            .contracts
            .get(&address)
            .map(|c| (c.vehicle_id.clone(), c.sold))
    }

    /// Count the call, apply scripted latency and failure.
    async fn enter(&self, operation: ChainOperation) -> Result<(), ChainError> {
        let (delay, failure) = {
            let mut state = self.state.lock();
            *state.calls.entry(operation).or_default() += 1;
            (
                state.delays.get(&operation).copied(),
                state.failures.remove(&operation),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map_or(Ok(()), Err)
    }
}

fn constructor_terms(args: &[Token]) -> Option<(String, Wei, Address)> {
    match args {
        [Token::String(vin), Token::Uint(cost), Token::Address(buyer)] => {
            Some((vin.clone(), Wei(*cost), *buyer))
        }
        _ => None,
    }
}

#[async_trait]
impl ChainClient for InMemoryChain {
    async fn accounts(&self) -> Result<Vec<Address>, ChainError> {
        self.enter(ChainOperation::Accounts).await?;
        Ok(self.state.lock().accounts.clone())
    }

    async fn balance(&self, address: Address) -> Result<Wei, ChainError> {
        self.enter(ChainOperation::Balance).await?;
        Ok(self
            .state
            .lock()
            .balances
            .get(&address)
            .copied()
            .unwrap_or(Wei::ZERO))
    }

    async fn unlock(
        &self,
        address: Address,
        passphrase: &str,
        duration: Duration,
    ) -> Result<bool, ChainError> {
        self.enter(ChainOperation::Unlock).await?;
        let mut state = self.state.lock();
        if state.passphrases.get(&address).map(String::as_str) != Some(passphrase) {
            return Ok(false);
        }
        state.unlocked_until.insert(address, Instant::now() + duration);
        Ok(true)
    }

    async fn deploy(&self, request: DeployRequest) -> Result<Deployment, ChainError> {
        self.enter(ChainOperation::Deploy).await?;
        request.artifact.abi.encode_constructor(&request.args)?;

        let mut state = self.state.lock();
        state.require_unlocked(request.from)?;
        if request.gas < INTRINSIC_GAS {
            return Err(ChainError::Rpc {
                code: -32000,
                message: "intrinsic gas too low".to_string(),
            });
        }
        let (vehicle_id, price, buyer) = constructor_terms(&request.args).ok_or_else(|| {
            ChainError::Reverted("constructor arguments do not match the sale contract".into())
        })?;

        let transaction_hash = state.next_tx_hash(request.from);
        let contract_address = state
            .next_contract
            .take()
            .unwrap_or_else(|| Address::from_slice(&transaction_hash.as_bytes()[12..]));
        state.block_number += 1;
        let block_number = state.block_number;

        state.contracts.insert(
            contract_address,
            SaleContract {
                deployer: request.from,
                vehicle_id,
                price,
                buyer,
                sold: false,
                abi: request.artifact.abi.clone(),
            },
        );
        debug!(
            contract = %format_address(&contract_address),
            block_number,
            "Simulated contract deployed"
        );

        Ok(Deployment {
            contract_address,
            transaction_hash,
            block_number,
        })
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<Receipt, ChainError> {
        self.enter(ChainOperation::Invoke).await?;
        request.abi.encode_call(&request.method, &request.args)?;

        let mut state = self.state.lock();
        state.require_unlocked(request.from)?;

        let (deployer, price, buyer, sold, event_names) = {
            let contract = state.contracts.get(&request.contract).ok_or_else(|| {
                ChainError::NotFound(format!(
                    "no contract at {}",
                    format_address(&request.contract)
                ))
            })?;
            let names: Vec<String> = contract
                .abi
                .event(&self.purchase_event)
                .map(|e| e.inputs.iter().map(|p| p.name.clone()).collect())
                .unwrap_or_default();
            (contract.deployer, contract.price, contract.buyer, contract.sold, names)
        };

        if request.method != self.purchase_method {
            return Err(ChainError::Reverted(format!(
                "{} is not callable on the sale contract",
                request.method
            )));
        }
        if request.from != buyer {
            return Err(ChainError::Reverted("caller is not the buyer".into()));
        }
        if request.value != price {
            return Err(ChainError::Reverted("value does not match price".into()));
        }
        if sold {
            return Err(ChainError::Reverted("vehicle already sold".into()));
        }
        let from_balance = state.balances.get(&request.from).copied().unwrap_or(Wei::ZERO);
        let remaining = from_balance.checked_sub(request.value).ok_or_else(|| ChainError::Rpc {
            code: -32000,
            message: "insufficient funds for gas * price + value".into(),
        })?;

        let to_balance = state.balances.get(&deployer).copied().unwrap_or(Wei::ZERO);
        let credited = to_balance.checked_add(request.value).ok_or_else(|| {
            ChainError::Reverted("balance overflow".into())
        })?;
        state.balances.insert(request.from, remaining);
        state.balances.insert(deployer, credited);
        if let Some(contract) = state.contracts.get_mut(&request.contract) {
            contract.sold = true;
        }

        let transaction_hash = state.next_tx_hash(request.from);
        state.block_number += 1;
        let block_number = state.block_number;

        let buyer_field = event_names.first().cloned().unwrap_or_else(|| "buyer".into());
        let price_field = event_names.get(1).cloned().unwrap_or_else(|| "price".into());
        state.logs.push(EventRecord::from_fields(
            self.purchase_event.clone(),
            request.contract,
            block_number,
            transaction_hash,
            0,
            vec![
                (buyer_field, Token::Address(request.from)),
                (price_field, Token::Uint(request.value.into_inner())),
            ],
        ));

        Ok(Receipt {
            transaction_hash,
            block_number,
            gas_used: SIMULATED_GAS_USED,
        })
    }

    async fn past_events(&self, query: EventQuery) -> Result<Vec<EventRecord>, ChainError> {
        self.enter(ChainOperation::PastEvents).await?;
        query.abi.event(&query.event)?;

        let state = self.state.lock();
        Ok(state
            .logs
            .iter()
            .filter(|log| log.contract == query.contract && log.event == query.event)
            .filter(|log| query.from_block.contains_lower(log.block_number))
            .filter(|log| query.to_block.contains_upper(log.block_number))
            .filter(|log| {
                query
                    .transaction_hash
                    .map_or(true, |hash| hash == log.transaction_hash)
            })
            .cloned()
            .collect())
    }
}

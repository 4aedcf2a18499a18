//! # Sale Workflow Service
//!
//! Drives one vehicle sale through `Created → ContractDeployed →
//! PaymentSettled` against a [`ChainClient`].
//!
//! ## Concurrency
//!
//! Every operation locks its vehicle's session slot for its whole
//! duration, chain calls included. A second `initialize` issued while a
//! deployment is mining waits for the deployment to finish and then
//! replaces the session.
//!
//! ## Time limits
//!
//! Reads and unlocks are bounded by `timeouts.chain_call`; deploy and
//! invoke, which wait for mining, by `timeouts.confirmation`. Expiry is
//! reported as [`SaleError::ChainTimeout`] and leaves the session phase
//! unchanged.

use async_trait::async_trait;
use shared_types::{format_address, Address, Wei};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{instrument, warn};
use vs_01_chain_client::{
    BlockSelector, ChainClient, ChainError, ContractArtifact, DeployRequest, EventQuery,
    EventRecord, InvokeRequest, Receipt, Token,
};
use vs_telemetry::{log_event, log_tx_event};

use crate::config::{EventScope, WorkflowConfig};
use crate::domain::{
    DeployOrder, DeploymentResult, SalePhase, SaleSession, SessionRegistry, SessionSnapshot,
    SettlementResult, WorkflowStats,
};
use crate::errors::{ConfigError, SaleError};
use crate::ports::inbound::SaleWorkflowApi;

const COMPONENT: &str = "sale-workflow";

/// The sale workflow orchestrator.
pub struct SaleWorkflowService {
    chain: Arc<dyn ChainClient>,
    artifact: Arc<ContractArtifact>,
    config: WorkflowConfig,
    registry: SessionRegistry,
    stats: RwLock<WorkflowStats>,
}

impl SaleWorkflowService {
    /// Build the service after checking the configuration against the
    /// contract interface.
    pub fn new(
        chain: Arc<dyn ChainClient>,
        artifact: Arc<ContractArtifact>,
        config: WorkflowConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let payable = artifact
            .abi
            .is_payable(&config.purchase_method)
            .map_err(|e| ConfigError::InvalidValue {
                field: "purchase_method",
                reason: e.to_string(),
            })?;
        if !payable {
            return Err(ConfigError::InvalidValue {
                field: "purchase_method",
                reason: format!("{} does not accept value", config.purchase_method),
            });
        }
        artifact
            .abi
            .event(&config.purchase_event)
            .map_err(|e| ConfigError::InvalidValue {
                field: "purchase_event",
                reason: e.to_string(),
            })?;

        Ok(Self {
            chain,
            artifact,
            config,
            registry: SessionRegistry::new(),
            stats: RwLock::new(WorkflowStats::default()),
        })
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Run a chain call under a time limit.
    ///
    /// The outer error is the timeout; the inner result is the call's own.
    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        limit: Duration,
        call: F,
    ) -> Result<Result<T, ChainError>, SaleError>
    where
        F: Future<Output = Result<T, ChainError>>,
    {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => Ok(result),
            Err(_) => {
                let elapsed_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                warn!(operation, elapsed_ms, "Chain call timed out");
                self.stats.write().await.chain_timeouts += 1;
                Err(SaleError::ChainTimeout {
                    operation,
                    elapsed_ms,
                })
            }
        }
    }

    async fn read_balance(&self, account: Address) -> Result<Wei, SaleError> {
        self.bounded(
            "eth_getBalance",
            self.config.timeouts.chain_call,
            self.chain.balance(account),
        )
        .await?
        .map_err(|e| {
            SaleError::ChainUnavailable(format!("balance of {}: {e}", format_address(&account)))
        })
    }

    async fn unlock(&self, account: Address, passphrase: &str) -> Result<(), SaleError> {
        let outcome = self
            .bounded(
                "personal_unlockAccount",
                self.config.timeouts.chain_call,
                self.chain
                    .unlock(account, passphrase, self.config.unlock_duration),
            )
            .await?;
        match outcome {
            Ok(true) => Ok(()),
            Ok(false) => Err(SaleError::AccountUnlockFailed {
                account,
                reason: "node refused the passphrase".to_string(),
            }),
            Err(e) => Err(SaleError::AccountUnlockFailed {
                account,
                reason: e.to_string(),
            }),
        }
    }

    async fn read_purchase_events(
        &self,
        contract: Address,
        receipt: &Receipt,
    ) -> Result<Vec<EventRecord>, SaleError> {
        let (from_block, to_block, transaction_hash) = match self.config.event_scope {
            EventScope::Transaction => (
                BlockSelector::Number(receipt.block_number),
                BlockSelector::Number(receipt.block_number),
                Some(receipt.transaction_hash),
            ),
            EventScope::FullHistory => (BlockSelector::Earliest, BlockSelector::Latest, None),
        };
        let query = EventQuery {
            contract,
            abi: self.artifact.abi.clone(),
            event: self.config.purchase_event.clone(),
            from_block,
            to_block,
            transaction_hash,
        };
        self.bounded(
            "eth_getLogs",
            self.config.timeouts.chain_call,
            self.chain.past_events(query),
        )
        .await?
        .map_err(|e| {
            SaleError::ChainUnavailable(format!(
                "reading {} events: {e}",
                self.config.purchase_event
            ))
        })
    }

    async fn record_failure(&self, operation: &'static str, error: &SaleError) {
        self.stats.write().await.failed_operations += 1;
        log_event!(
            warn,
            COMPONENT,
            "Sale operation failed",
            operation,
            code = error.code(),
            error = %error
        );
    }

    async fn run_initialize(&self) -> Result<SessionSnapshot, SaleError> {
        let vehicle_id = self.config.vehicle_id.clone();
        let slot = self.registry.slot(&vehicle_id);
        let mut guard = slot.lock().await;

        let accounts = self
            .bounded(
                "eth_accounts",
                self.config.timeouts.chain_call,
                self.chain.accounts(),
            )
            .await?
            .map_err(|e| SaleError::ChainUnavailable(format!("listing accounts: {e}")))?;
        let buyer = select_account(&accounts, self.config.buyer_index, "buyer")?;
        let dealer = select_account(&accounts, self.config.dealer_index, "dealer")?;
        let buyer_balance = self.read_balance(buyer).await?;
        let dealer_balance = self.read_balance(dealer).await?;

        let session = SaleSession::new(vehicle_id.clone(), self.config.price, buyer, dealer)?;
        let snapshot = SessionSnapshot {
            vehicle_id: vehicle_id.clone(),
            price: session.price(),
            buyer,
            dealer,
            buyer_balance,
            dealer_balance,
        };

        if let Some(previous) = guard.replace(session) {
            if let Some(contract) = previous.contract_address() {
                self.registry.unindex_contract(&contract);
            }
            log_event!(
                info,
                COMPONENT,
                "Replaced previous session",
                vehicle_id = %vehicle_id,
                previous_phase = %previous.phase()
            );
        }
        self.stats.write().await.sessions_initialized += 1;

        log_event!(
            info,
            COMPONENT,
            "Sale session initialized",
            vehicle_id = %vehicle_id,
            buyer = %format_address(&buyer),
            dealer = %format_address(&dealer)
        );
        Ok(snapshot)
    }

    async fn run_deploy(&self, order: DeployOrder) -> Result<DeploymentResult, SaleError> {
        let no_session = || SaleError::InvalidPhaseTransition {
            expected: SalePhase::Created,
            actual: None,
        };
        let slot = self.registry.find(&order.vehicle_id).ok_or_else(no_session)?;
        let mut guard = slot.lock().await;
        let session = guard.as_mut().ok_or_else(no_session)?;

        session.ensure_phase(SalePhase::Created)?;
        session.verify_terms(order.price, order.buyer, order.dealer)?;

        self.unlock(session.dealer(), &self.config.dealer_passphrase)
            .await?;

        let request = DeployRequest {
            artifact: self.artifact.clone(),
            args: vec![
                Token::String(session.vehicle_id().to_string()),
                Token::Uint(session.price().into_inner()),
                Token::Address(session.buyer()),
            ],
            from: session.dealer(),
            gas: self.config.gas_limit,
        };
        let deployment = self
            .bounded(
                "deploy",
                self.config.timeouts.confirmation,
                self.chain.deploy(request),
            )
            .await?
            .map_err(|e| {
                if e.is_transport() {
                    SaleError::ChainUnavailable(format!("deploying contract: {e}"))
                } else {
                    SaleError::DeploymentFailed(e.to_string())
                }
            })?;

        session.record_deployment(deployment.contract_address)?;
        self.registry
            .index_contract(deployment.contract_address, session.vehicle_id());
        self.stats.write().await.contracts_deployed += 1;

        log_tx_event!(
            info,
            COMPONENT,
            "Sale contract deployed",
            deployment.transaction_hash,
            vehicle_id = %session.vehicle_id(),
            contract = %format_address(&deployment.contract_address),
            block_number = deployment.block_number
        );

        Ok(DeploymentResult {
            vehicle_id: session.vehicle_id().to_string(),
            price: session.price(),
            buyer: session.buyer(),
            dealer: session.dealer(),
            contract_address: deployment.contract_address,
        })
    }

    async fn run_payment(&self, contract: Address) -> Result<SettlementResult, SaleError> {
        let no_session = || SaleError::InvalidPhaseTransition {
            expected: SalePhase::ContractDeployed,
            actual: None,
        };
        let slot = self
            .registry
            .find_by_contract(&contract)
            .ok_or_else(no_session)?;
        let mut guard = slot.lock().await;
        let session = guard.as_mut().ok_or_else(no_session)?;

        // The vehicle may have been re-initialized since the lookup.
        match session.contract_address() {
            Some(current) if current == contract => {}
            Some(current) => {
                return Err(SaleError::AddressMismatch {
                    field: "contract",
                    expected: current,
                    actual: contract,
                })
            }
            None => {
                return Err(SaleError::InvalidPhaseTransition {
                    expected: SalePhase::ContractDeployed,
                    actual: Some(session.phase()),
                })
            }
        }
        session.ensure_phase(SalePhase::ContractDeployed)?;

        self.unlock(session.buyer(), &self.config.buyer_passphrase)
            .await?;

        let request = InvokeRequest {
            contract,
            abi: self.artifact.abi.clone(),
            method: self.config.purchase_method.clone(),
            args: Vec::new(),
            from: session.buyer(),
            value: session.price(),
            gas: self.config.gas_limit,
        };
        let receipt = self
            .bounded(
                "invoke",
                self.config.timeouts.confirmation,
                self.chain.invoke(request),
            )
            .await?
            .map_err(|e| {
                if e.is_transport() {
                    SaleError::ChainUnavailable(format!("submitting payment: {e}"))
                } else {
                    SaleError::PaymentFailed(e.to_string())
                }
            })?;

        // The transfer is on chain from here on; later read failures do not
        // roll the phase back.
        session.record_settlement()?;
        self.stats.write().await.payments_settled += 1;
        log_tx_event!(
            info,
            COMPONENT,
            "Payment settled",
            receipt.transaction_hash,
            vehicle_id = %session.vehicle_id(),
            contract = %format_address(&contract),
            block_number = receipt.block_number
        );

        let events = self.read_purchase_events(contract, &receipt).await?;
        session.record_events(events.clone())?;
        let buyer_balance = self.read_balance(session.buyer()).await?;
        let dealer_balance = self.read_balance(session.dealer()).await?;

        Ok(SettlementResult {
            events,
            buyer_balance,
            dealer_balance,
        })
    }
}

fn select_account(accounts: &[Address], index: usize, role: &str) -> Result<Address, SaleError> {
    accounts.get(index).copied().ok_or_else(|| {
        SaleError::ChainUnavailable(format!(
            "node exposes {} accounts, {role} index {index} is out of range",
            accounts.len()
        ))
    })
}

#[async_trait]
impl SaleWorkflowApi for SaleWorkflowService {
    #[instrument(skip(self), fields(vehicle_id = %self.config.vehicle_id))]
    async fn initialize(&self) -> Result<SessionSnapshot, SaleError> {
        let result = self.run_initialize().await;
        if let Err(e) = &result {
            self.record_failure("initialize", e).await;
        }
        result
    }

    #[instrument(skip(self, order), fields(vehicle_id = %order.vehicle_id))]
    async fn deploy_contract(&self, order: DeployOrder) -> Result<DeploymentResult, SaleError> {
        let result = self.run_deploy(order).await;
        if let Err(e) = &result {
            self.record_failure("deploy_contract", e).await;
        }
        result
    }

    #[instrument(skip(self), fields(contract = %format_address(&contract_address)))]
    async fn submit_payment(
        &self,
        contract_address: Address,
    ) -> Result<SettlementResult, SaleError> {
        let result = self.run_payment(contract_address).await;
        if let Err(e) = &result {
            self.record_failure("submit_payment", e).await;
        }
        result
    }

    async fn session(&self, vehicle_id: &str) -> Option<SaleSession> {
        self.registry.get(vehicle_id).await
    }

    async fn stats(&self) -> WorkflowStats {
        self.stats.read().await.clone()
    }
}

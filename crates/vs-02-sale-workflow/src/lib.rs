//! # Sale Workflow
//!
//! Orchestrates a vehicle sale in three phases: `initialize` reads the
//! participating accounts, `deploy_contract` publishes the sale contract
//! from the dealer, `submit_payment` pays for it from the buyer and reports
//! the purchase events plus final balances.
//!
//! ## Architecture
//!
//! - `domain/`: session state machine, per-vehicle registry, results
//! - `ports/`: the inbound [`SaleWorkflowApi`]
//! - `service`: [`SaleWorkflowService`], driving a
//!   [`vs_01_chain_client::ChainClient`]

pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use config::{EventScope, TimeoutConfig, WorkflowConfig};
pub use domain::{
    DeployOrder, DeploymentResult, SalePhase, SaleSession, SessionRegistry, SessionSnapshot,
    SettlementResult, WorkflowStats,
};
pub use errors::{ConfigError, SaleError};
pub use ports::SaleWorkflowApi;
pub use service::SaleWorkflowService;

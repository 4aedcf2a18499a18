//! # Chain Client Subsystem
//!
//! Access to an Ethereum-compatible node for the vehicle sale workflow:
//! account listing, balances, account unlocking, contract deployment,
//! contract invocation and past event queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌─────────────────────────┐
//! │ vs-02 sale workflow      │──uses─▶│ ports::ChainClient      │
//! └──────────────────────────┘        └────────────┬────────────┘
//!                                                  │ implemented by
//!                               ┌──────────────────┴──────────────────┐
//!                               ▼                                     ▼
//!                    ┌─────────────────────┐              ┌─────────────────────┐
//!                    │ JsonRpcChainClient  │              │ InMemoryChain       │
//!                    │ (HTTP JSON-RPC)     │              │ (tests, --dev)      │
//!                    └─────────────────────┘              └─────────────────────┘
//! ```
//!
//! ## ABI
//!
//! [`domain::abi`] adapts `alloy-json-abi` interfaces and `alloy-dyn-abi`
//! encoding to the workspace's `primitive-types` values, for scalar Solidity
//! types. Artifacts are loaded from plain `{abi, bytecode}` JSON or
//! `solc --combined-json abi,bin` output.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;

pub use adapters::{ChainOperation, InMemoryChain, JsonRpcChainClient, RpcConfig};
pub use domain::{
    BlockSelector, ContractAbi, ContractArtifact, DeployRequest, Deployment, EventQuery,
    EventRecord, InvokeRequest, Receipt, Token, VEHICLE_SALE_ABI,
};
pub use errors::{AbiError, ChainError, ChainResult};
pub use ports::ChainClient;

//! # Node Runtime Library
//!
//! Configuration loading and wiring for the `sale-node` binary, exposed as a
//! library so the startup path can be tested without a process.
//!
//! - `config`: TOML [`NodeConfig`] and its validation
//! - `cli`: flags and `VS_*` overrides
//! - `runtime`: chain client, workflow and gateway assembly

pub mod cli;
pub mod config;
pub mod runtime;

pub use cli::Args;
pub use config::{ChainConfig, ConfigError, DevChainConfig, NodeConfig};
pub use runtime::{dev_account, dev_chain, NodeError, NodeRuntime, SERVICE_NAME};

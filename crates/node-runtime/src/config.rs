//! # Node Configuration
//!
//! Unified configuration for the chain connection, the sale workflow and the
//! HTTP gateway, loaded from TOML:
//!
//! ```toml
//! [chain]
//! rpc_url = "http://localhost:8545"
//! artifact = "contracts/Vehicle2.json"
//!
//! [workflow]
//! vehicle_id = "1234567890"
//! price = "1000000000000000000"
//!
//! [gateway.http]
//! port = 9999
//! ```
//!
//! Every section and field is optional. Command-line flags and `VS_*`
//! environment variables are applied on top (see [`crate::cli`]).

use serde::{Deserialize, Serialize};
use shared_types::serde_helpers::duration_str;
use shared_types::Wei;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use vs_01_chain_client::RpcConfig;
use vs_02_sale_workflow::WorkflowConfig;
use vs_03_api_gateway::GatewayConfig;

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC node and contract artifact.
    pub chain: ChainConfig,
    /// In-memory chain used instead of a node.
    pub dev: DevChainConfig,
    /// Sale terms and chain call limits.
    pub workflow: WorkflowConfig,
    /// HTTP server.
    pub gateway: GatewayConfig,
}

impl NodeConfig {
    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check every section, plus the rules that span sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.workflow.validate()?;
        self.gateway.validate()?;

        if self.dev.enabled {
            let highest = self.workflow.buyer_index.max(self.workflow.dealer_index);
            if self.dev.accounts <= highest {
                return Err(ConfigError::Invalid(format!(
                    "dev.accounts must be greater than {highest} to cover buyer and dealer"
                )));
            }
        } else {
            if !(self.chain.rpc_url.starts_with("http://")
                || self.chain.rpc_url.starts_with("https://"))
            {
                return Err(ConfigError::Invalid(format!(
                    "chain.rpc_url must be an http(s) URL, got {:?}",
                    self.chain.rpc_url
                )));
            }
            if self.chain.artifact.is_none() {
                return Err(ConfigError::Invalid(
                    "chain.artifact is required unless dev mode is enabled".into(),
                ));
            }
        }

        if self.chain.poll_interval.is_zero() || self.chain.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "chain timeouts and poll interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Ethereum node connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,
    #[serde(with = "duration_str")]
    pub connect_timeout: Duration,
    /// Delay between receipt polls while a transaction is mining.
    #[serde(with = "duration_str")]
    pub poll_interval: Duration,
    /// Compiled contract: `{"abi", "bytecode"}` or solc combined JSON.
    pub artifact: Option<PathBuf>,
    /// Contract to pick from a combined JSON holding several.
    pub contract: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        let rpc = RpcConfig::default();
        Self {
            rpc_url: rpc.url,
            request_timeout: rpc.request_timeout,
            connect_timeout: rpc.connect_timeout,
            poll_interval: rpc.poll_interval,
            artifact: None,
            contract: None,
        }
    }
}

impl ChainConfig {
    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.rpc_url.clone(),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
            poll_interval: self.poll_interval,
        }
    }
}

/// Seeded in-memory chain for running without a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevChainConfig {
    pub enabled: bool,
    /// Number of node-managed accounts.
    pub accounts: usize,
    /// Starting balance of every account, in wei.
    pub balance: Wei,
}

impl Default for DevChainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            accounts: 4,
            balance: Wei::from_ether(100),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("workflow: {0}")]
    Workflow(#[from] vs_02_sale_workflow::ConfigError),

    #[error("gateway: {0}")]
    Gateway(#[from] vs_03_api_gateway::domain::ConfigError),

    #[error("{0}")]
    Invalid(String),
}

//! Wiring: chain client → sale workflow → HTTP gateway.

use shared_types::Address;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use vs_01_chain_client::{
    AbiError, ChainClient, ChainError, ContractArtifact, InMemoryChain, JsonRpcChainClient,
};
use vs_02_sale_workflow::{SaleWorkflowApi, SaleWorkflowService, WorkflowConfig};
use vs_03_api_gateway::{GatewayError, GatewayService};

use crate::config::{ConfigError, DevChainConfig, NodeConfig};

/// Name reported on `/health` and in logs.
pub const SERVICE_NAME: &str = "sale-node";

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("chain client: {0}")]
    Chain(#[from] ChainError),

    #[error("contract artifact: {0}")]
    Artifact(#[from] AbiError),

    #[error("gateway: {0}")]
    Gateway(#[from] GatewayError),
}

/// The assembled node.
pub struct NodeRuntime {
    workflow: Arc<SaleWorkflowService>,
    gateway: GatewayService,
}

impl NodeRuntime {
    /// Connect the configured chain, load the contract and build the
    /// workflow and gateway on top.
    pub fn build(config: NodeConfig) -> Result<Self, NodeError> {
        let chain = connect_chain(&config)?;
        let artifact = Arc::new(load_artifact(&config)?);

        let workflow = SaleWorkflowService::new(chain, artifact, config.workflow.clone())
            .map_err(ConfigError::from)?;
        let workflow = Arc::new(workflow);

        let api: Arc<dyn SaleWorkflowApi> = workflow.clone();
        let gateway = GatewayService::new(config.gateway, api, SERVICE_NAME)?;

        Ok(Self { workflow, gateway })
    }

    pub fn workflow(&self) -> Arc<SaleWorkflowService> {
        Arc::clone(&self.workflow)
    }

    pub fn gateway(&self) -> &GatewayService {
        &self.gateway
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), NodeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("===========================================");
        info!("  Vehicle Sale Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            vehicle_id = %self.workflow.config().vehicle_id,
            price_wei = %self.workflow.config().price,
            addr = %self.gateway.config().http_addr(),
            "Node ready"
        );

        self.gateway.run(shutdown).await?;
        Ok(())
    }
}

fn connect_chain(config: &NodeConfig) -> Result<Arc<dyn ChainClient>, NodeError> {
    if config.dev.enabled {
        info!(accounts = config.dev.accounts, "Using in-memory dev chain");
        return Ok(Arc::new(dev_chain(&config.dev, &config.workflow)));
    }
    let client = JsonRpcChainClient::new(config.chain.rpc_config())?;
    info!(url = %client.url(), "Using JSON-RPC chain");
    Ok(Arc::new(client))
}

fn load_artifact(config: &NodeConfig) -> Result<ContractArtifact, NodeError> {
    match &config.chain.artifact {
        Some(path) => {
            let artifact = ContractArtifact::load(path, config.chain.contract.as_deref())?;
            info!(
                path = %path.display(),
                contract = ?artifact.name,
                bytecode_len = artifact.bytecode.len(),
                "Loaded contract artifact"
            );
            Ok(artifact)
        }
        // Only reachable in dev mode; validation demands a file otherwise.
        None => Ok(ContractArtifact::vehicle_sale_interface()?),
    }
}

/// In-memory chain seeded with funded accounts. The configured buyer and
/// dealer accounts unlock with the configured passphrases.
pub fn dev_chain(dev: &DevChainConfig, workflow: &WorkflowConfig) -> InMemoryChain {
    let chain = InMemoryChain::with_contract_names(
        workflow.purchase_method.clone(),
        workflow.purchase_event.clone(),
    );
    for index in 0..dev.accounts {
        let passphrase = if index == workflow.buyer_index {
            workflow.buyer_passphrase.as_str()
        } else if index == workflow.dealer_index {
            workflow.dealer_passphrase.as_str()
        } else {
            ""
        };
        chain.add_account(dev_account(index), dev.balance, passphrase);
    }
    chain
}

/// Address of the `index`-th dev account.
pub fn dev_account(index: usize) -> Address {
    Address::from_low_u64_be(0xa000 + index as u64)
}

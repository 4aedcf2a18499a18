//! Command-line flags.
//!
//! Each flag can also be set through the `VS_*` variable named in its help.
//! Precedence, lowest first: built-in defaults, the `--config` file,
//! environment, command line.

use clap::Parser;
use shared_types::Wei;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::{ConfigError, NodeConfig};

#[derive(Parser, Debug, Default)]
#[command(name = "sale-node", version)]
#[command(about = "Vehicle sale node: browser UI and HTTP API over an Ethereum node")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "VS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run against a seeded in-memory chain instead of a JSON-RPC node
    #[arg(long)]
    pub dev: bool,

    /// HTTP bind address
    #[arg(long, env = "VS_HOST")]
    pub host: Option<IpAddr>,

    /// HTTP port
    #[arg(short, long, env = "VS_PORT")]
    pub port: Option<u16>,

    /// JSON-RPC endpoint of the Ethereum node
    #[arg(long, env = "VS_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Compiled sale contract (ABI + bytecode JSON)
    #[arg(long, env = "VS_ARTIFACT")]
    pub artifact: Option<PathBuf>,

    /// Directory served as the browser UI
    #[arg(long, env = "VS_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Vehicle sold by this node
    #[arg(long, env = "VS_VEHICLE_ID")]
    pub vehicle_id: Option<String>,

    /// Sale price in wei (decimal or 0x hex)
    #[arg(long, env = "VS_PRICE")]
    pub price: Option<Wei>,
}

impl Args {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut NodeConfig) {
        if self.dev {
            config.dev.enabled = true;
        }
        if let Some(host) = self.host {
            config.gateway.http.host = host;
        }
        if let Some(port) = self.port {
            config.gateway.http.port = port;
        }
        if let Some(url) = &self.rpc_url {
            config.chain.rpc_url = url.clone();
        }
        if let Some(artifact) = &self.artifact {
            config.chain.artifact = Some(artifact.clone());
        }
        if let Some(dir) = &self.static_dir {
            config.gateway.static_files.dir = dir.clone();
        }
        if let Some(vehicle_id) = &self.vehicle_id {
            config.workflow.vehicle_id = vehicle_id.clone();
        }
        if let Some(price) = self.price {
            config.workflow.price = price;
        }
    }

    /// Defaults, then the config file, then flags; validated.
    pub fn load_config(&self) -> Result<NodeConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::load(path)?,
            None => NodeConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

//! # Vehicle Sale Node
//!
//! Entry point of `sale-node`.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags
//! 2. Initialise logging from `VS_LOG_LEVEL` / `RUST_LOG` / `VS_JSON_LOGS`
//! 3. Load and validate configuration
//! 4. Connect the chain (JSON-RPC node, or in-memory with `--dev`)
//! 5. Serve HTTP until Ctrl+C, then drain in-flight requests

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use node_runtime::{Args, NodeRuntime};
use vs_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialise logging")?;

    let config = args.load_config().context("failed to load configuration")?;
    let runtime = NodeRuntime::build(config).context("failed to start node")?;

    runtime.run(shutdown_signal()).await?;
    info!("Node stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            // Without a signal handler the node runs until killed.
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

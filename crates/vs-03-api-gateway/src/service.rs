//! Gateway service: binds the listener and serves the router until shutdown.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use vs_02_sale_workflow::SaleWorkflowApi;

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::GatewayMetrics;
use crate::router::{build_router, AppState};

/// HTTP front of the sale workflow.
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayService {
    pub fn new(
        config: GatewayConfig,
        workflow: Arc<dyn SaleWorkflowApi>,
        service_name: &str,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        if config.static_files.enabled && !config.static_files.dir.is_dir() {
            tracing::warn!(
                dir = %config.static_files.dir.display(),
                "Static content directory not found, UI requests will 404"
            );
        }
        Ok(Self {
            config,
            state: AppState {
                workflow,
                metrics: Arc::new(GatewayMetrics::new()),
                service_name: Arc::from(service_name),
            },
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        let router = self.router();
        info!(
            addr = ?local,
            static_dir = %self.config.static_files.dir.display(),
            "Gateway listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("Gateway stopped");
        Ok(())
    }

    /// Bind and serve.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}

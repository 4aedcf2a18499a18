//! Shared fixtures: a seeded in-memory chain, the workflow and gateway on
//! top of it, and small HTTP helpers for driving the router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use shared_types::{Address, Wei};
use std::sync::Arc;
use tower::ServiceExt;
use vs_01_chain_client::{ContractArtifact, InMemoryChain};
use vs_02_sale_workflow::{SaleWorkflowService, WorkflowConfig};
use vs_03_api_gateway::{GatewayConfig, GatewayService};

pub const VEHICLE_ID: &str = "1234567890";

/// Account `A<n>` of the seeded chain.
pub fn account(n: u64) -> Address {
    Address::from_low_u64_be(0xa0 + n)
}

/// Accounts `[A0, A1, A2, A3]`; A1 is the buyer with 100 ether, A2 the
/// dealer with 50 ether.
pub fn seeded_chain() -> Arc<InMemoryChain> {
    let chain = InMemoryChain::new();
    chain.add_account(account(0), Wei::ZERO, "");
    chain.add_account(account(1), Wei::from_ether(100), "buyer");
    chain.add_account(account(2), Wei::from_ether(50), "dealer");
    chain.add_account(account(3), Wei::ZERO, "");
    Arc::new(chain)
}

/// Workflow selling the default vehicle for 10 ether.
pub fn workflow_config() -> WorkflowConfig {
    WorkflowConfig {
        price: Wei::from_ether(10),
        ..WorkflowConfig::default()
    }
}

pub fn workflow(chain: Arc<InMemoryChain>, config: WorkflowConfig) -> Arc<SaleWorkflowService> {
    let artifact = Arc::new(ContractArtifact::vehicle_sale_interface().unwrap());
    Arc::new(SaleWorkflowService::new(chain, artifact, config).unwrap())
}

/// Gateway router without the static fallback.
pub fn router(workflow: Arc<SaleWorkflowService>) -> Router {
    let mut config = GatewayConfig::default();
    config.static_files.enabled = false;
    GatewayService::new(config, workflow, "sale-node")
        .unwrap()
        .router()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request and decode the JSON body (`Null` when not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// `POST /contract` body built from a `GET /init` response.
pub fn order_from(init: &Value) -> Value {
    serde_json::json!({
        "vehicleId": init["vehicleId"],
        "price": init["price"],
        "buyer": init["buyer"],
        "dealer": init["dealer"],
    })
}

/// Run `/init` and `/contract`, returning the contract address.
pub async fn deploy(router: &Router) -> String {
    let (status, init) = send(router, get("/init")).await;
    assert_eq!(status, StatusCode::OK, "init failed: {init}");
    let (status, deployed) = send(router, post_json("/contract", &order_from(&init))).await;
    assert_eq!(status, StatusCode::OK, "deploy failed: {deployed}");
    deployed["contractAddress"].as_str().unwrap().to_string()
}

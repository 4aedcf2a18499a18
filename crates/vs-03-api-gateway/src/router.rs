//! Routes and handlers.
//!
//! | Route                       | Workflow operation |
//! |-----------------------------|--------------------|
//! | `GET  /init`                | `initialize`       |
//! | `POST /contract`            | `deploy_contract`  |
//! | `POST /payment`             | `submit_payment`   |
//! | `GET  /sessions/:vehicle_id`| `session`          |
//! | `GET  /health`              |                    |
//! | `GET  /metrics`             | `stats`            |
//!
//! Anything else falls through to the static UI directory.

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::Uri;
use axum::routing::{get, post};
use axum::{Json, Router};
use shared_types::parse_address;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::debug;
use vs_02_sale_workflow::SaleWorkflowApi;

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{
    ContractRequest, ContractResponse, HealthResponse, InitResponse, PaymentRequest,
    PaymentResponse, SessionView,
};
use crate::middleware::{create_cors_layer, track_metrics, GatewayMetrics, TimeoutLayer, TracingLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<dyn SaleWorkflowApi>,
    pub metrics: Arc<GatewayMetrics>,
    pub service_name: Arc<str>,
}

/// Build the full router with middleware applied.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let api = Router::new()
        .route("/init", get(init))
        .route("/contract", post(deploy_contract))
        .route("/payment", post(submit_payment))
        .route("/sessions/:vehicle_id", get(session))
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let routed = if config.static_files.enabled {
        api.fallback_service(ServeDir::new(&config.static_files.dir))
    } else {
        api.fallback(not_found)
    };

    routed
        .layer(DefaultBodyLimit::max(config.limits.max_request_size))
        .layer(TimeoutLayer::new(config.timeouts.clone()))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.metrics),
            track_metrics,
        ))
        .layer(TracingLayer::new())
        .layer(create_cors_layer(&config.cors))
        .with_state(state)
}

async fn init(State(state): State<AppState>) -> ApiResult<Json<InitResponse>> {
    let snapshot = state.workflow.initialize().await?;
    Ok(Json(snapshot.into()))
}

async fn deploy_contract(
    State(state): State<AppState>,
    payload: Result<Json<ContractRequest>, JsonRejection>,
) -> ApiResult<Json<ContractResponse>> {
    let Json(request) = payload.inspect_err(|e| debug!(error = %e, "Rejected contract body"))?;
    let order = request.into_order()?;
    let result = state.workflow.deploy_contract(order).await?;
    Ok(Json(result.into()))
}

async fn submit_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<Json<PaymentResponse>> {
    let Json(request) = payload.inspect_err(|e| debug!(error = %e, "Rejected payment body"))?;
    let contract = parse_address(&request.contract_address)?;
    let result = state.workflow.submit_payment(contract).await?;
    Ok(Json(result.into()))
}

async fn session(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<SessionView>> {
    let session = state
        .workflow
        .session(&vehicle_id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("session for vehicle {vehicle_id}")))?;
    Ok(Json(SessionView::from(&session)))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.service_name.to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let workflow = state.workflow.stats().await;
    Json(serde_json::json!({
        "gateway": state.metrics.to_json(),
        "workflow": workflow,
    }))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use shared_types::{Address, Wei};
    use tower::ServiceExt;
    use vs_01_chain_client::{ChainError, ChainOperation, ContractArtifact, InMemoryChain};
    use vs_02_sale_workflow::{SaleWorkflowService, WorkflowConfig};

    fn chain() -> Arc<InMemoryChain> {
        let chain = InMemoryChain::new();
        chain.add_account(Address::from_low_u64_be(0xa0), Wei::ZERO, "");
        chain.add_account(Address::from_low_u64_be(0xa1), Wei::from_ether(100), "buyer");
        chain.add_account(Address::from_low_u64_be(0xa2), Wei::from_ether(50), "dealer");
        Arc::new(chain)
    }

    fn app_with(chain: Arc<InMemoryChain>, config: GatewayConfig) -> Router {
        let workflow = SaleWorkflowService::new(
            chain,
            Arc::new(ContractArtifact::vehicle_sale_interface().unwrap()),
            WorkflowConfig {
                price: Wei::from_ether(10),
                ..WorkflowConfig::default()
            },
        )
        .unwrap();
        let state = AppState {
            workflow: Arc::new(workflow),
            metrics: Arc::new(GatewayMetrics::new()),
            service_name: Arc::from("sale-node"),
        };
        build_router(state, &config)
    }

    fn app(chain: Arc<InMemoryChain>) -> Router {
        let mut config = GatewayConfig::default();
        config.static_files.enabled = false;
        app_with(chain, config)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_sale_over_http() {
        let app = app(chain());

        let (status, init) = send(&app, get_req("/init")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(init["vehicleId"], "1234567890");
        assert_eq!(init["price"], "10000000000000000000");
        assert_eq!(init["buyerBalance"], "100");
        assert_eq!(init["dealerBalance"], "50");

        let order = json!({
            "vehicleId": init["vehicleId"],
            "price": init["price"],
            "buyer": init["buyer"],
            "dealer": init["dealer"],
        });
        let (status, deployed) = send(&app, post_json("/contract", &order)).await;
        assert_eq!(status, StatusCode::OK);
        let contract = deployed["contractAddress"].as_str().unwrap().to_string();
        assert!(contract.starts_with("0x"));
        assert_eq!(contract.len(), 42);

        let (status, paid) = send(
            &app,
            post_json("/payment", &json!({ "contractAddress": contract })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["buyerBalance"], "90");
        assert_eq!(paid["dealerBalance"], "60");
        assert_eq!(paid["events"][0]["event"], "Bought");
        assert_eq!(paid["events"][0]["returnValues"]["buyer"], init["buyer"]);

        let (status, view) = send(&app, get_req("/sessions/1234567890")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["phase"], "paymentSettled");
        assert_eq!(view["contractAddress"], contract.as_str());
    }

    #[tokio::test]
    async fn test_payment_before_deploy_conflicts() {
        let app = app(chain());
        send(&app, get_req("/init")).await;

        let (status, body) = send(
            &app,
            post_json(
                "/payment",
                &json!({ "contractAddress": "0x0000000000000000000000000000000000c0ffee" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "InvalidPhaseTransition");
    }

    #[tokio::test]
    async fn test_price_mismatch_conflicts() {
        let app = app(chain());
        let (_, init) = send(&app, get_req("/init")).await;

        let order = json!({
            "vehicleId": "1234567890",
            "price": "1",
            "buyer": init["buyer"],
            "dealer": init["dealer"],
        });
        let (status, body) = send(&app, post_json("/contract", &order)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PriceMismatch");
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_structured() {
        let app = app(chain());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/contract")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidRequest");

        let (status, body) = send(&app, post_json("/payment", &json!({ "contract": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidRequest");

        let (status, body) = send(
            &app,
            post_json("/payment", &json!({ "contractAddress": "0xnothex" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "InvalidRequest");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/payment")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = GatewayConfig::default();
        config.static_files.enabled = false;
        config.limits.max_request_size = 64;
        let app = app_with(chain(), config);

        let padding = "a".repeat(256);
        let (status, body) = send(
            &app,
            post_json("/payment", &json!({ "contractAddress": padding })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_chain_outage_is_503() {
        let chain = chain();
        chain.fail_next(
            ChainOperation::Accounts,
            ChainError::Transport("connection refused".into()),
        );
        let app = app(chain);

        let (status, body) = send(&app, get_req("/init")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "ChainUnavailable");
    }

    #[tokio::test]
    async fn test_unknown_session_and_route() {
        let app = app(chain());

        let (status, body) = send(&app, get_req("/sessions/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NotFound");

        let (status, body) = send(&app, get_req("/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NotFound");
    }

    #[tokio::test]
    async fn test_health_and_metrics() {
        let app = app(chain());

        let (status, health) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["service"], "sale-node");

        send(&app, get_req("/init")).await;
        let (status, metrics) = send(&app, get_req("/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(metrics["workflow"]["sessionsInitialized"], 1);
        // health and init finished before this request was counted
        assert_eq!(metrics["gateway"]["requests"]["total"], 2);
    }

    #[tokio::test]
    async fn test_static_fallback_serves_ui() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Vehicle sale</h1>").unwrap();

        let mut config = GatewayConfig::default();
        config.static_files.dir = dir.path().to_path_buf();
        let app = app_with(chain(), config);

        let response = app.clone().oneshot(get_req("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>Vehicle sale</h1>");

        // API routes still win over the fallback.
        let (status, _) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }
}

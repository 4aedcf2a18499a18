//! # Sale Flow
//!
//! The three phases as the browser drives them: `/init`, `/contract`,
//! `/payment`, then the session view.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use node_runtime::{NodeConfig, NodeRuntime};
    use serde_json::json;
    use shared_types::format_address;
    use std::path::Path;

    use crate::fixtures::*;

    #[tokio::test]
    async fn test_init_reports_configured_accounts() {
        let router = router(workflow(seeded_chain(), workflow_config()));

        let (status, init) = send(&router, get("/init")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(init["vehicleId"], VEHICLE_ID);
        assert_eq!(init["price"], "10000000000000000000");
        assert_eq!(init["buyer"], format_address(&account(1)).as_str());
        assert_eq!(init["dealer"], format_address(&account(2)).as_str());
        assert_eq!(init["buyerBalance"], "100");
        assert_eq!(init["dealerBalance"], "50");
    }

    #[tokio::test]
    async fn test_complete_sale() {
        let chain = seeded_chain();
        let router = router(workflow(chain.clone(), workflow_config()));

        let contract = deploy(&router).await;
        let (_, view) = send(&router, get("/sessions/1234567890")).await;
        assert_eq!(view["phase"], "contractDeployed");
        assert_eq!(view["contractAddress"], contract.as_str());

        let (status, paid) = send(
            &router,
            post_json("/payment", &json!({ "contractAddress": contract })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["buyerBalance"], "90");
        assert_eq!(paid["dealerBalance"], "60");

        let events = paid["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["event"], "Bought");
        assert_eq!(events[0]["address"], contract.as_str());
        assert_eq!(
            events[0]["returnValues"]["buyer"],
            format_address(&account(1)).as_str()
        );
        assert_eq!(events[0]["returnValues"]["price"], "10000000000000000000");

        let (_, view) = send(&router, get("/sessions/1234567890")).await;
        assert_eq!(view["phase"], "paymentSettled");
        assert_eq!(view["contractAddress"], contract.as_str());
        assert_eq!(view["events"], paid["events"]);

        let (_, metrics) = send(&router, get("/metrics")).await;
        assert_eq!(metrics["workflow"]["sessionsInitialized"], 1);
        assert_eq!(metrics["workflow"]["contractsDeployed"], 1);
        assert_eq!(metrics["workflow"]["paymentsSettled"], 1);
        assert_eq!(metrics["workflow"]["failedOperations"], 0);
    }

    #[tokio::test]
    async fn test_reinitialize_starts_a_new_sale() {
        let router = router(workflow(seeded_chain(), workflow_config()));
        let first = deploy(&router).await;
        send(
            &router,
            post_json("/payment", &json!({ "contractAddress": first })),
        )
        .await;

        let (status, init) = send(&router, get("/init")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(init["buyerBalance"], "90");

        let (_, view) = send(&router, get("/sessions/1234567890")).await;
        assert_eq!(view["phase"], "created");
        assert!(view["contractAddress"].is_null());
        assert!(view["events"].as_array().unwrap().is_empty());

        // The settled contract belongs to the replaced session.
        let (status, body) = send(
            &router,
            post_json("/payment", &json!({ "contractAddress": first })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "InvalidPhaseTransition");

        let second = deploy(&router).await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_dev_node_serves_ui_and_api() {
        let mut config = NodeConfig::default();
        config.dev.enabled = true;
        config.gateway.static_files.dir =
            Path::new(env!("CARGO_MANIFEST_DIR")).join("../content");
        let runtime = NodeRuntime::build(config).unwrap();
        let router = runtime.gateway().router();

        let response = {
            use tower::ServiceExt;
            router.clone().oneshot(get("/")).await.unwrap()
        };
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("car.js"));

        let contract = deploy(&router).await;
        let (status, paid) = send(
            &router,
            post_json("/payment", &json!({ "contractAddress": contract })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["buyerBalance"], "99");
        assert_eq!(paid["dealerBalance"], "101");
    }
}

//! # Failure Propagation
//!
//! A chain failure injected at each stage of the sale must reach the
//! browser as a structured error with the right status, and must leave the
//! session where it was so the step can be retried.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use std::time::Duration;
    use vs_01_chain_client::{ChainError, ChainOperation};
    use vs_02_sale_workflow::TimeoutConfig;

    use crate::fixtures::*;

    fn transport() -> ChainError {
        ChainError::Transport("connection refused".into())
    }

    fn reverted() -> ChainError {
        ChainError::Reverted("out of gas".into())
    }

    fn assert_error(status: StatusCode, body: &Value, expected: StatusCode, code: &str) {
        assert_eq!(status, expected, "unexpected body: {body}");
        assert_eq!(body["error"]["code"], code);
        assert!(!body["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_failures() {
        for operation in [ChainOperation::Accounts, ChainOperation::Balance] {
            let chain = seeded_chain();
            let router = router(workflow(chain.clone(), workflow_config()));

            chain.fail_next(operation, transport());
            let (status, body) = send(&router, get("/init")).await;
            assert_error(status, &body, StatusCode::SERVICE_UNAVAILABLE, "ChainUnavailable");

            let (status, _) = send(&router, get("/sessions/1234567890")).await;
            assert_eq!(status, StatusCode::NOT_FOUND);

            let (status, _) = send(&router, get("/init")).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_contract_failures() {
        let cases = [
            (
                ChainOperation::Unlock,
                transport(),
                StatusCode::FORBIDDEN,
                "AccountUnlockFailed",
            ),
            (
                ChainOperation::Deploy,
                reverted(),
                StatusCode::BAD_GATEWAY,
                "DeploymentFailed",
            ),
            (
                ChainOperation::Deploy,
                transport(),
                StatusCode::SERVICE_UNAVAILABLE,
                "ChainUnavailable",
            ),
        ];

        for (operation, error, expected, code) in cases {
            let chain = seeded_chain();
            let router = router(workflow(chain.clone(), workflow_config()));
            let (_, init) = send(&router, get("/init")).await;

            chain.fail_next(operation, error);
            let (status, body) = send(&router, post_json("/contract", &order_from(&init))).await;
            assert_error(status, &body, expected, code);

            let (_, view) = send(&router, get("/sessions/1234567890")).await;
            assert_eq!(view["phase"], "created");

            // The dealer can simply try again.
            let (status, _) = send(&router, post_json("/contract", &order_from(&init))).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_payment_failures_before_transfer() {
        let cases = [
            (
                ChainOperation::Unlock,
                transport(),
                StatusCode::FORBIDDEN,
                "AccountUnlockFailed",
            ),
            (
                ChainOperation::Invoke,
                reverted(),
                StatusCode::BAD_GATEWAY,
                "PaymentFailed",
            ),
        ];

        for (operation, error, expected, code) in cases {
            let chain = seeded_chain();
            let router = router(workflow(chain.clone(), workflow_config()));
            let contract = deploy(&router).await;
            let payment = json!({ "contractAddress": contract });

            chain.fail_next(operation, error);
            let (status, body) = send(&router, post_json("/payment", &payment)).await;
            assert_error(status, &body, expected, code);

            let (_, view) = send(&router, get("/sessions/1234567890")).await;
            assert_eq!(view["phase"], "contractDeployed");

            let (status, paid) = send(&router, post_json("/payment", &payment)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(paid["buyerBalance"], "90");
        }
    }

    #[tokio::test]
    async fn test_payment_failures_after_transfer() {
        for operation in [ChainOperation::PastEvents, ChainOperation::Balance] {
            let chain = seeded_chain();
            let router = router(workflow(chain.clone(), workflow_config()));
            let contract = deploy(&router).await;
            let payment = json!({ "contractAddress": contract });

            chain.fail_next(operation, transport());
            let (status, body) = send(&router, post_json("/payment", &payment)).await;
            assert_error(status, &body, StatusCode::SERVICE_UNAVAILABLE, "ChainUnavailable");

            // The money moved, so the sale is settled and cannot be paid twice.
            let (_, view) = send(&router, get("/sessions/1234567890")).await;
            assert_eq!(view["phase"], "paymentSettled");
            // Events read before the failure stay with the session.
            let recorded = usize::from(operation == ChainOperation::Balance);
            assert_eq!(view["events"].as_array().unwrap().len(), recorded);
            let (status, body) = send(&router, post_json("/payment", &payment)).await;
            assert_error(status, &body, StatusCode::CONFLICT, "InvalidPhaseTransition");
        }
    }

    #[tokio::test]
    async fn test_slow_deploy_times_out() {
        let chain = seeded_chain();
        let config = vs_02_sale_workflow::WorkflowConfig {
            timeouts: TimeoutConfig {
                chain_call: Duration::from_millis(20),
                confirmation: Duration::from_millis(50),
            },
            ..workflow_config()
        };
        let router = router(workflow(chain.clone(), config));
        let (_, init) = send(&router, get("/init")).await;

        chain.set_delay(ChainOperation::Deploy, Duration::from_millis(500));
        let (status, body) = send(&router, post_json("/contract", &order_from(&init))).await;
        assert_error(status, &body, StatusCode::GATEWAY_TIMEOUT, "ChainTimeout");

        let (_, metrics) = send(&router, get("/metrics")).await;
        assert_eq!(metrics["workflow"]["chainTimeouts"], 1);
        assert_eq!(metrics["workflow"]["failedOperations"], 1);
        assert_eq!(metrics["workflow"]["contractsDeployed"], 0);
    }
}

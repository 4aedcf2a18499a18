//! # Concurrent Requests
//!
//! Requests touching the same vehicle are serialized: a sale can be paid
//! once, and re-initializing never interleaves with a deploy in flight.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use vs_01_chain_client::ChainOperation;

    use crate::fixtures::*;

    #[tokio::test]
    async fn test_double_payment_settles_once() {
        let chain = seeded_chain();
        let router = router(workflow(chain.clone(), workflow_config()));
        let contract = deploy(&router).await;
        let payment = json!({ "contractAddress": contract });

        chain.set_delay(ChainOperation::Invoke, Duration::from_millis(30));
        let (first, second) = futures::join!(
            send(&router, post_json("/payment", &payment)),
            send(&router, post_json("/payment", &payment)),
        );

        let mut statuses = [first.0, second.0];
        statuses.sort();
        assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
        assert_eq!(chain.calls(ChainOperation::Invoke), 1);

        let (_, init) = send(&router, get("/init")).await;
        assert_eq!(init["buyerBalance"], "90");
        assert_eq!(init["dealerBalance"], "60");
    }

    #[tokio::test]
    async fn test_initialize_waits_for_deploy_in_flight() {
        let chain = seeded_chain();
        let router = router(workflow(chain.clone(), workflow_config()));
        let (_, init) = send(&router, get("/init")).await;

        chain.set_delay(ChainOperation::Deploy, Duration::from_millis(50));
        let deploying = {
            let router = router.clone();
            let order = order_from(&init);
            tokio::spawn(async move { send(&router, post_json("/contract", &order)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let (init_status, _) = send(&router, get("/init")).await;
        let (deploy_status, deployed) = deploying.await.unwrap();

        assert_eq!(init_status, StatusCode::OK);
        assert_eq!(deploy_status, StatusCode::OK);
        assert_eq!(chain.calls(ChainOperation::Deploy), 1);

        // The second initialize ran after the deploy and started over.
        let (_, view) = send(&router, get("/sessions/1234567890")).await;
        assert_eq!(view["phase"], "created");
        let (status, _) = send(
            &router,
            post_json(
                "/payment",
                &json!({ "contractAddress": deployed["contractAddress"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_sessions_readable_during_payment() {
        let chain = seeded_chain();
        let router = router(workflow(chain.clone(), workflow_config()));
        let contract = deploy(&router).await;

        chain.set_delay(ChainOperation::Invoke, Duration::from_millis(200));
        let paying = {
            let router = router.clone();
            let payment = json!({ "contractAddress": contract });
            tokio::spawn(async move { send(&router, post_json("/payment", &payment)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let (status, health) = send(&router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");

        let (status, _) = paying.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }
}

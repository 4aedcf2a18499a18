//! End-to-end scenarios over the gateway router.

pub mod concurrency;
pub mod failures;
pub mod sale_flow;

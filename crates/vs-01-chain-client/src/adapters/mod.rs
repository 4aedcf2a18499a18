//! Adapters implementing the [`crate::ports::ChainClient`] port.

pub mod in_memory;
pub mod json_rpc;
pub mod rpc_types;

pub use in_memory::{ChainOperation, InMemoryChain};
pub use json_rpc::{JsonRpcChainClient, RpcConfig};

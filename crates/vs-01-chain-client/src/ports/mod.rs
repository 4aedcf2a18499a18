//! Port definitions for the chain client.

pub mod outbound;

pub use outbound::ChainClient;

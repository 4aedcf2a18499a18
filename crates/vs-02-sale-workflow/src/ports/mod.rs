//! Port definitions for the sale workflow.

pub mod inbound;

pub use inbound::SaleWorkflowApi;

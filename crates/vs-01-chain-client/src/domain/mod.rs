//! Chain-facing value types and ABI glue.

pub mod abi;
pub mod artifact;
pub mod entities;

pub use abi::{ContractAbi, Event, EventLogExt, Function, Param, Token};
pub use artifact::{ContractArtifact, VEHICLE_SALE_ABI};
pub use entities::*;

//! # Shared Types Crate
//!
//! Chain primitives used on both sides of the sale workflow: the chain
//! client speaks them to the node, the gateway renders them to browsers.
//!
//! ## Design Principles
//!
//! - **Wei everywhere inside**: amounts are kept as exact `U256` wei values.
//!   Conversion to ether strings happens only at the HTTP boundary via
//!   [`Wei::format_ether`].
//! - **Lenient in, strict out**: [`Wei`] deserializes from decimal strings,
//!   `0x` hex strings and JSON numbers, and always serializes as a decimal
//!   string so no precision is lost in JavaScript clients.

pub mod errors;
pub mod primitives;
pub mod serde_helpers;

pub use errors::*;
pub use primitives::*;

//! # Vehicle-Sale Test Suite
//!
//! Cross-crate tests driving the HTTP gateway, the sale workflow and the
//! in-memory chain together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # seeded chain, router, HTTP helpers
//! └── integration/
//!     ├── sale_flow.rs   # happy path, end to end
//!     ├── failures.rs    # chain failures at every stage
//!     └── concurrency.rs # overlapping requests
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vs-tests
//! cargo test -p vs-tests integration::failures::
//! ```

#[cfg(test)]
pub mod fixtures;
pub mod integration;

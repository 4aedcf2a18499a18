//! # Vehicle-Sale Telemetry
//!
//! Structured logging for the sale node: an `EnvFilter`-driven
//! `tracing-subscriber` writing either human-readable text or JSON lines.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vs_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VS_SERVICE_NAME` | `sale-node` | Service name attached to the startup log |
//! | `VS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `VS_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |
//! | `VS_LOG_TARGETS` | `true` | Include the module target in each line |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_telemetry;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),
}

/// Log an event tagged with the emitting component.
///
/// ```rust,ignore
/// log_event!(info, "sale-workflow", "Session initialized", vehicle_id = %id);
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a transaction-related event with standard fields.
#[macro_export]
macro_rules! log_tx_event {
    ($level:ident, $component:expr, $msg:expr, $tx_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            tx_hash = ?$tx_hash,
            $($($field)*,)?
            $msg
        )
    };
}

//! Sale workflow domain: session state machine, registry and results.

pub mod registry;
pub mod results;
pub mod session;

pub use registry::{SessionRegistry, SessionSlot};
pub use results::{DeployOrder, DeploymentResult, SessionSnapshot, SettlementResult, WorkflowStats};
pub use session::{SalePhase, SaleSession};

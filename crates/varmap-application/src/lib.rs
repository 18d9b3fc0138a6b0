//! Application layer for varmap.
//!
//! Coordinates the domain traits implemented by the infrastructure layer:
//! the reconciliation engine keeps local points in step with the remote
//! service, and the map session turns that into restart-durable UI state.

pub mod reconciliation;
pub mod session;

pub use reconciliation::{ReconciliationEngine, SyncLoops};
pub use session::{MapSession, UiState};

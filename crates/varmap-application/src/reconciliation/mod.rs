//! Point reconciliation between the local store and the remote service.

mod engine;

pub use engine::{ReconciliationEngine, SyncLoops};

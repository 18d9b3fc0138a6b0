//! Domain layer for Varmap.
//!
//! Models, repository traits and the shared error type. Nothing in here does
//! I/O; implementations live in `varmap-infrastructure`.

pub mod config;
pub mod error;
pub mod point;
pub mod session_state;

// Re-export common error type
pub use error::{Result, VarmapError};

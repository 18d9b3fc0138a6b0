//! Session state domain module.
//!
//! UI state that survives process restarts (camera center, chat drawer,
//! selected point, pending dialog) and the repository it is persisted through.

mod model;
mod repository;

pub use model::{
    DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, PendingAddDialog, SessionState, StateEntry,
    StateValue, default_messages, keys,
};
pub use repository::SessionStateRepository;

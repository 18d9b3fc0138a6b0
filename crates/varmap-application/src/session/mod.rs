//! Presentation-side session handling.

mod map_session;

pub use map_session::{MapSession, UiState};

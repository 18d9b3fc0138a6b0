//! Point domain module.
//!
//! # Module Structure
//!
//! - `model`: the `Point` model and the canonical collection order
//! - `repository`: trait for the local, observable point store
//! - `remote`: trait for the remote authoritative service

mod model;
mod remote;
mod repository;

pub use model::{Point, canonical_order};
pub use remote::PointRemote;
pub use repository::PointRepository;

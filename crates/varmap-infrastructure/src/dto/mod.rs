//! Data Transfer Objects (DTOs) for persistence and the remote API.
//!
//! These are private to the infrastructure layer; the domain works with
//! `varmap_core::point::Point` only.

mod point;

pub use point::{PointDto, PointsDocument};

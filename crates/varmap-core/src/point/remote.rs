//! Remote point service trait.

use super::model::Point;
use crate::error::Result;
use async_trait::async_trait;

/// Network boundary to the authoritative point collection.
///
/// The remote assigns ids. Failures are reported as
/// [`VarmapError::Network`](crate::VarmapError::Network) or
/// [`VarmapError::Decode`](crate::VarmapError::Decode).
#[async_trait]
pub trait PointRemote: Send + Sync {
    /// Fetches the entire remote collection.
    async fn fetch_all(&self) -> Result<Vec<Point>>;

    /// Sends a batch of points and returns the remote's resulting collection.
    async fn upsert_all(&self, points: Vec<Point>) -> Result<Vec<Point>>;
}

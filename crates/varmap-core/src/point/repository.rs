//! Local point store trait.

use super::model::Point;
use crate::error::Result;
use tokio::sync::watch;

/// The local, durable collection of points.
///
/// Implementations serialize their own writes: callers may issue
/// `replace_all` and `upsert` from any number of tasks without holding a lock.
/// Every published snapshot is a complete collection in canonical order
/// (see [`canonical_order`](super::canonical_order)); a reader never sees a
/// half-applied replacement.
#[async_trait::async_trait]
pub trait PointRepository: Send + Sync {
    /// Atomically clears the collection and inserts `points`.
    ///
    /// On error the previous collection stays in place, both durably and in
    /// the published snapshot.
    async fn replace_all(&self, points: Vec<Point>) -> Result<()>;

    /// Inserts a point, overwriting the row with the same id if there is one.
    ///
    /// A point without an id is always inserted as a new row. Returns the
    /// stored point.
    async fn upsert(&self, point: Point) -> Result<Point>;

    /// Returns a point-in-time snapshot of the collection.
    async fn get_all(&self) -> Result<Vec<Point>>;

    /// Subscribes to the change feed.
    ///
    /// The receiver starts at the current collection and observes a new
    /// snapshot after every mutation.
    fn subscribe(&self) -> watch::Receiver<Vec<Point>>;
}

//! Local point store implementation.
//!
//! The current collection lives in a `watch` channel, which doubles as the
//! change feed. Mutations are serialized by an async mutex: the next snapshot
//! is computed, written to disk (when durable), and only then published.

use crate::dto::PointsDocument;
use crate::paths::{ServiceType, VarmapPaths};
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use varmap_core::error::{Result, VarmapError};
use varmap_core::point::{Point, PointRepository, canonical_order};

/// Point store backed by `points.toml`, or by nothing at all.
///
/// # Example
///
/// ```ignore
/// let repo = LocalPointRepository::open(path).await?;
/// repo.upsert(Point::new("Dock", 10.0, 20.0)).await?;
/// let mut feed = repo.subscribe();
/// ```
pub struct LocalPointRepository {
    file: Option<Arc<AtomicTomlFile<PointsDocument>>>,
    feed: watch::Sender<Vec<Point>>,
    write_lock: Mutex<()>,
}

impl LocalPointRepository {
    /// Opens (or creates on first write) the durable store at `path`.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<PointsDocument>::new(path));

        let loader = file.clone();
        let document = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| VarmapError::internal(format!("Failed to join task: {}", e)))??
            .unwrap_or_default();

        let points = canonical_order(document.points);
        tracing::debug!(
            path = %file.path().display(),
            count = points.len(),
            "Loaded local points"
        );

        Ok(Self {
            file: Some(file),
            feed: watch::Sender::new(points),
            write_lock: Mutex::new(()),
        })
    }

    /// Opens the store at its default location under `base_dir`.
    pub async fn open_default(base_dir: Option<&Path>) -> Result<Self> {
        let path = VarmapPaths::new(base_dir).get_path(ServiceType::Points)?;
        Self::open(path).await
    }

    /// A store with the same contract and no durability.
    pub fn in_memory() -> Self {
        Self {
            file: None,
            feed: watch::Sender::new(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Computes, persists and publishes the next snapshot.
    ///
    /// `next` sees the current snapshot and returns the new collection plus a
    /// value for the caller.
    async fn mutate<R, F>(&self, next: F) -> Result<R>
    where
        F: FnOnce(&[Point]) -> (Vec<Point>, R),
    {
        let _guard = self.write_lock.lock().await;

        let (points, out) = {
            let current = self.feed.borrow();
            next(current.as_slice())
        };
        let points = canonical_order(points);

        if let Some(file) = &self.file {
            let file = file.clone();
            let document = PointsDocument {
                points: points.clone(),
            };
            tokio::task::spawn_blocking(move || file.save(&document))
                .await
                .map_err(|e| VarmapError::internal(format!("Failed to join task: {}", e)))??;
        }

        self.feed.send_replace(points);
        Ok(out)
    }
}

#[async_trait]
impl PointRepository for LocalPointRepository {
    async fn replace_all(&self, points: Vec<Point>) -> Result<()> {
        let count = points.len();
        self.mutate(move |_| (points, ())).await?;
        tracing::debug!(count, "Replaced local points");
        Ok(())
    }

    async fn upsert(&self, point: Point) -> Result<Point> {
        self.mutate(move |current| {
            let mut points = current.to_vec();
            let slot = point
                .id
                .and_then(|id| points.iter().position(|p| p.id == Some(id)));
            match slot {
                Some(index) => points[index] = point.clone(),
                None => points.push(point.clone()),
            }
            (points, point)
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<Point>> {
        Ok(self.feed.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<Point>> {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalPointRepository::open(temp_dir.path().join("points.toml"))
            .await
            .unwrap();

        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace_all_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.toml");

        {
            let repo = LocalPointRepository::open(path.clone()).await.unwrap();
            repo.replace_all(vec![
                Point::new("B", 3.0, 4.0).with_id(2),
                Point::new("A", 1.0, 2.0).with_id(1),
            ])
            .await
            .unwrap();
        }

        let reopened = LocalPointRepository::open(path).await.unwrap();
        let points = reopened.get_all().await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, Some(1));
        assert_eq!(points[1].id, Some(2));
    }

    #[tokio::test]
    async fn test_upsert_without_id_always_inserts() {
        let repo = LocalPointRepository::in_memory();

        repo.upsert(Point::new("X", 5.0, 6.0)).await.unwrap();
        repo.upsert(Point::new("X", 5.0, 6.0)).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let repo = LocalPointRepository::in_memory();
        repo.replace_all(vec![Point::new("old", 1.0, 1.0).with_id(7)])
            .await
            .unwrap();

        let stored = repo
            .upsert(Point::new("new", 2.0, 2.0).with_id(7))
            .await
            .unwrap();

        assert_eq!(stored.name, "new");
        let points = repo.get_all().await.unwrap();
        assert_eq!(points, vec![Point::new("new", 2.0, 2.0).with_id(7)]);
    }

    #[tokio::test]
    async fn test_subscribe_starts_at_current_state_and_sees_mutations() {
        let repo = LocalPointRepository::in_memory();
        repo.upsert(Point::new("first", 0.0, 0.0)).await.unwrap();

        let mut feed = repo.subscribe();
        assert_eq!(feed.borrow_and_update().len(), 1);

        repo.upsert(Point::new("second", 0.0, 0.0)).await.unwrap();
        feed.changed().await.unwrap();
        assert_eq!(feed.borrow_and_update().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file in the way").unwrap();
        let repo = LocalPointRepository::open(blocker.join("points.toml"))
            .await
            .unwrap();
        let feed = repo.subscribe();

        let err = repo
            .replace_all(vec![Point::new("X", 5.0, 6.0).with_id(1)])
            .await
            .unwrap_err();

        assert!(err.is_storage());
        assert!(repo.get_all().await.unwrap().is_empty());
        assert!(!feed.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_open_default_uses_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LocalPointRepository::open_default(Some(temp_dir.path()))
            .await
            .unwrap();
        repo.upsert(Point::new("X", 5.0, 6.0)).await.unwrap();

        assert!(temp_dir.path().join("points.toml").exists());
    }
}

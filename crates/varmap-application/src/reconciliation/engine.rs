//! Keeps the local point collection in step with the remote one.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use varmap_core::config::SyncSettings;
use varmap_core::error::{Result, VarmapError};
use varmap_core::point::{Point, PointRemote, PointRepository};

const TARGET: &str = "varmap::sync";

/// Reconciles the local store against the remote service.
///
/// Three independent triggers write to the local collection: the slow and
/// fast pull loops started by [`start`](Self::start), and the push that
/// follows every [`add_local`](Self::add_local). None of them exclude each
/// other. Each replace overwrites the whole collection, so whichever finishes
/// last wins.
///
/// # Known hazard
///
/// A pull that completes while a locally added point has not been pushed yet
/// replaces the collection with the remote copy, dropping that point.
pub struct ReconciliationEngine {
    store: Arc<dyn PointRepository>,
    remote: Arc<dyn PointRemote>,
    slow_interval: Duration,
    fast_interval: Duration,
    /// Number of bracketed pulls currently running. Only touched inside
    /// `syncing.send_if_modified`, which serializes updates.
    in_flight: AtomicUsize,
    syncing: watch::Sender<bool>,
    last_synced_at: RwLock<Option<DateTime<Utc>>>,
    started: AtomicBool,
    shutdown: CancellationToken,
}

/// Handles of the two pull loops.
pub struct SyncLoops {
    pub slow: JoinHandle<()>,
    pub fast: JoinHandle<()>,
}

impl SyncLoops {
    /// Waits for both loops to exit.
    pub async fn join(self) {
        let (slow, fast) = tokio::join!(self.slow, self.fast);
        for result in [slow, fast] {
            if let Err(e) = result {
                tracing::error!(target: TARGET, "Sync loop ended abnormally: {}", e);
            }
        }
    }
}

impl ReconciliationEngine {
    pub fn new(
        store: Arc<dyn PointRepository>,
        remote: Arc<dyn PointRemote>,
        settings: &SyncSettings,
    ) -> Self {
        Self {
            store,
            remote,
            slow_interval: settings.slow_pull_interval(),
            fast_interval: settings.fast_pull_interval(),
            in_flight: AtomicUsize::new(0),
            syncing: watch::Sender::new(false),
            last_synced_at: RwLock::new(None),
            started: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Live point collection.
    pub fn points(&self) -> watch::Receiver<Vec<Point>> {
        self.store.subscribe()
    }

    /// `true` while a fast-loop pull or a manual sync is running.
    pub fn syncing(&self) -> watch::Receiver<bool> {
        self.syncing.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        *self.syncing.borrow()
    }

    /// Time of the last pull or push that reached the local store.
    pub async fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        *self.last_synced_at.read().await
    }

    /// Token cancelled by [`shutdown`](Self::shutdown).
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Fetches the remote collection and replaces the local one with it.
    ///
    /// On failure the local collection is untouched. Returns the number of
    /// points stored.
    pub async fn pull_and_replace(&self) -> Result<usize> {
        let points = self.remote.fetch_all().await?;
        let count = points.len();
        self.store.replace_all(points).await?;
        self.mark_synced().await;
        tracing::debug!(target: TARGET, "Pulled {} points", count);
        Ok(count)
    }

    /// Sends the whole local collection and stores the remote's answer in
    /// its place.
    pub async fn push_local_then_replace(&self) -> Result<usize> {
        let local = self.store.get_all().await?;
        tracing::debug!(target: TARGET, "Pushing {} local points", local.len());

        let points = self.remote.upsert_all(local).await?;
        let count = points.len();
        self.store.replace_all(points).await?;
        self.mark_synced().await;
        tracing::debug!(target: TARGET, "Push accepted, {} points stored", count);
        Ok(count)
    }

    /// Stores `point` locally without an id and pushes in the background.
    ///
    /// The point is visible in [`points`](Self::points) once this returns. A
    /// failed push is logged and leaves the point in place. The returned
    /// handle resolves with the outcome of the push.
    pub async fn add_local(self: &Arc<Self>, point: Point) -> Result<JoinHandle<Result<usize>>> {
        let stored = self.store.upsert(point.detached()).await?;
        tracing::info!(target: TARGET, "Added point {:?} locally", stored.name);

        let engine = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let result = engine.push_local_then_replace().await;
            if let Err(e) = &result {
                tracing::warn!(target: TARGET, "Push after local add failed: {}", e);
            }
            result
        }))
    }

    /// Runs one pull with the syncing flag raised and reports its outcome.
    pub async fn manual_sync(&self) -> Result<usize> {
        let _syncing = self.begin_syncing();
        tracing::info!(target: TARGET, "Manual sync requested");
        self.pull_and_replace().await
    }

    /// Spawns the slow and fast pull loops.
    ///
    /// Fails if the loops were already started for this engine.
    pub fn start(self: &Arc<Self>) -> Result<SyncLoops> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!(target: TARGET, "Sync loops already running, skipping");
            return Err(VarmapError::internal("Sync loops already started"));
        }

        tracing::info!(
            target: TARGET,
            "Sync loops started (slow {:?}, fast {:?})",
            self.slow_interval,
            self.fast_interval
        );

        Ok(SyncLoops {
            slow: tokio::spawn(Arc::clone(self).run_slow_loop()),
            fast: tokio::spawn(Arc::clone(self).run_fast_loop()),
        })
    }

    /// Stops both loops. A pull already in progress finishes; no new one
    /// starts and pending waits end immediately.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!(target: TARGET, "Stopping sync loops");
        }
        self.shutdown.cancel();
    }

    async fn run_slow_loop(self: Arc<Self>) {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.slow_interval) => {}
            }

            tracing::debug!(target: TARGET, "Slow tick");
            if let Err(e) = self.pull_and_replace().await {
                tracing::warn!(target: TARGET, "Periodic pull failed: {}", e);
            }
        }
        tracing::debug!(target: TARGET, "Slow loop stopped");
    }

    async fn run_fast_loop(self: Arc<Self>) {
        while !self.shutdown.is_cancelled() {
            tracing::debug!(target: TARGET, "Fast tick");
            {
                let _syncing = self.begin_syncing();
                if let Err(e) = self.pull_and_replace().await {
                    tracing::warn!(target: TARGET, "Periodic pull failed: {}", e);
                }
            }

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.fast_interval) => {}
            }
        }
        tracing::debug!(target: TARGET, "Fast loop stopped");
    }

    async fn mark_synced(&self) {
        *self.last_synced_at.write().await = Some(Utc::now());
    }

    fn begin_syncing(&self) -> SyncingGuard<'_> {
        self.syncing.send_if_modified(|flag| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            let changed = !*flag;
            *flag = true;
            changed
        });
        SyncingGuard { engine: self }
    }
}

/// Lowers the syncing flag when the last bracketed pull ends, including when
/// the pull is cancelled or panics.
struct SyncingGuard<'a> {
    engine: &'a ReconciliationEngine,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        let engine = self.engine;
        engine.syncing.send_if_modified(|flag| {
            let remaining = engine.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            if remaining == 0 && *flag {
                *flag = false;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedRemote(Vec<Point>);

    #[async_trait]
    impl PointRemote for FixedRemote {
        async fn fetch_all(&self) -> Result<Vec<Point>> {
            Ok(self.0.clone())
        }

        async fn upsert_all(&self, _points: Vec<Point>) -> Result<Vec<Point>> {
            Ok(self.0.clone())
        }
    }

    struct VecStore {
        feed: watch::Sender<Vec<Point>>,
    }

    #[async_trait]
    impl PointRepository for VecStore {
        async fn replace_all(&self, points: Vec<Point>) -> Result<()> {
            self.feed.send_replace(points);
            Ok(())
        }

        async fn upsert(&self, point: Point) -> Result<Point> {
            self.feed.send_modify(|points| points.push(point.clone()));
            Ok(point)
        }

        async fn get_all(&self) -> Result<Vec<Point>> {
            Ok(self.feed.borrow().clone())
        }

        fn subscribe(&self) -> watch::Receiver<Vec<Point>> {
            self.feed.subscribe()
        }
    }

    fn engine(remote: Vec<Point>) -> Arc<ReconciliationEngine> {
        let store = Arc::new(VecStore {
            feed: watch::Sender::new(Vec::new()),
        });
        Arc::new(ReconciliationEngine::new(
            store,
            Arc::new(FixedRemote(remote)),
            &SyncSettings::default(),
        ))
    }

    #[test]
    fn test_syncing_guard_counts_overlapping_brackets() {
        let engine = engine(Vec::new());
        let rx = engine.syncing();

        let first = engine.begin_syncing();
        let second = engine.begin_syncing();
        assert!(*rx.borrow());

        drop(first);
        assert!(*rx.borrow(), "flag must stay up while a bracket is open");

        drop(second);
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn test_pull_records_last_synced_at() {
        let engine = engine(vec![Point::new("Dock", 10.0, 20.0).with_id(1)]);
        assert!(engine.last_synced_at().await.is_none());

        let count = engine.pull_and_replace().await.unwrap();

        assert_eq!(count, 1);
        assert!(engine.last_synced_at().await.is_some());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let engine = engine(Vec::new());

        let loops = engine.start().unwrap();
        assert!(engine.start().is_err());

        engine.shutdown();
        loops.join().await;
    }

    #[tokio::test]
    async fn test_add_local_strips_id() {
        let engine = engine(Vec::new());
        let mut rx = engine.points();

        let push = engine
            .add_local(Point::new("X", 5.0, 6.0).with_id(7))
            .await
            .unwrap();

        assert_eq!(rx.borrow_and_update().clone(), vec![Point::new("X", 5.0, 6.0)]);
        push.await.unwrap().unwrap();
    }
}

//! Shared fixtures for the application integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use varmap_application::ReconciliationEngine;
use varmap_core::config::SyncSettings;
use varmap_core::point::{Point, PointRemote, PointRepository};
use varmap_core::{Result, VarmapError};
use varmap_infrastructure::LocalPointRepository;

/// In-process remote with a mutable collection, a failure switch and an
/// artificial latency.
pub struct ScriptedRemote {
    points: Mutex<Vec<Point>>,
    next_id: AtomicI64,
    failing: AtomicBool,
    latency: Mutex<Duration>,
    fetches: AtomicUsize,
    pushes: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new(points: Vec<Point>) -> Arc<Self> {
        let next_id = points.iter().filter_map(|p| p.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            points: Mutex::new(points),
            next_id: AtomicI64::new(next_id),
            failing: AtomicBool::new(false),
            latency: Mutex::new(Duration::ZERO),
            fetches: AtomicUsize::new(0),
            pushes: AtomicUsize::new(0),
        })
    }

    pub fn set_points(&self, points: Vec<Point>) {
        *self.points.lock().unwrap() = points;
    }

    pub fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }

    pub fn set_next_id(&self, id: i64) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn pushes(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<()> {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(VarmapError::http_status(503, "scripted outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl PointRemote for ScriptedRemote {
    async fn fetch_all(&self) -> Result<Vec<Point>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self.points())
    }

    async fn upsert_all(&self, batch: Vec<Point>) -> Result<Vec<Point>> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;

        let mut points = self.points.lock().unwrap();
        for mut point in batch {
            let existing = point
                .id
                .and_then(|id| points.iter().position(|p| p.id == Some(id)));
            match existing {
                Some(index) => points[index] = point,
                None => {
                    if point.id.is_none() {
                        point.id = Some(self.next_id.fetch_add(1, Ordering::SeqCst));
                    }
                    points.push(point);
                }
            }
        }
        points.sort_by_key(|p| p.id);
        Ok(points.clone())
    }
}

pub fn settings(slow_ms: u64, fast_ms: u64) -> SyncSettings {
    SyncSettings {
        slow_pull_interval_ms: slow_ms,
        fast_pull_interval_ms: fast_ms,
        ..SyncSettings::default()
    }
}

/// Engine over an in-memory store.
pub fn engine_with(
    remote: Arc<ScriptedRemote>,
    settings: &SyncSettings,
) -> (Arc<ReconciliationEngine>, Arc<LocalPointRepository>) {
    let store = Arc::new(LocalPointRepository::in_memory());
    let engine = Arc::new(ReconciliationEngine::new(
        store.clone() as Arc<dyn PointRepository>,
        remote as Arc<dyn PointRemote>,
        settings,
    ));
    (engine, store)
}

pub fn dock() -> Point {
    Point::new("Dock", 10.0, 20.0).with_id(1)
}

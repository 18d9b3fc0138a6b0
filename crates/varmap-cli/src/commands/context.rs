//! Wiring shared by every subcommand.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use varmap_application::{MapSession, ReconciliationEngine};
use varmap_core::config::SyncSettings;
use varmap_core::point::{PointRemote, PointRepository};
use varmap_infrastructure::{
    ConfigService, FileSessionStateStore, HttpPointRemote, LocalPointRepository,
};

pub struct AppContext {
    pub settings: SyncSettings,
    pub store: Arc<LocalPointRepository>,
    pub state_store: Arc<FileSessionStateStore>,
    pub engine: Arc<ReconciliationEngine>,
}

impl AppContext {
    /// Loads settings and opens the durable stores under `data_dir` (or the
    /// platform directories), then builds the engine over them.
    pub async fn build(data_dir: Option<&Path>, base_url: Option<String>) -> Result<Self> {
        let config = ConfigService::new(data_dir)?;
        let mut settings = config
            .load()
            .with_context(|| format!("Failed to load {}", config.path().display()))?;
        if let Some(url) = base_url {
            settings.base_url = url;
        }

        let store = Arc::new(
            LocalPointRepository::open_default(data_dir)
                .await
                .context("Failed to open point store")?,
        );
        let state_store = Arc::new(
            FileSessionStateStore::open_default(data_dir)
                .await
                .context("Failed to open session state")?,
        );
        let remote = HttpPointRemote::new(&settings)?;

        let engine = Arc::new(ReconciliationEngine::new(
            store.clone() as Arc<dyn PointRepository>,
            Arc::new(remote) as Arc<dyn PointRemote>,
            &settings,
        ));

        Ok(Self {
            settings,
            store,
            state_store,
            engine,
        })
    }

    pub async fn session(&self) -> Result<Arc<MapSession>> {
        MapSession::hydrate(self.engine.clone(), self.state_store.clone()).await
    }
}

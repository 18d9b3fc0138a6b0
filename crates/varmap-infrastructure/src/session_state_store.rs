//! Session state store implementation.
//!
//! Persists the restart-durable UI state as a flat TOML table of primitive
//! values (`session_state.toml`).

use crate::paths::{ServiceType, VarmapPaths};
use crate::storage::AtomicTomlFile;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use varmap_core::error::{Result, VarmapError};
use varmap_core::session_state::{SessionStateRepository, StateEntry, StateValue};

type StateTable = BTreeMap<String, StateValue>;

/// Key/value store for session state.
///
/// Values are cached in memory and every write is saved before it becomes
/// visible to `get`, so a failed save leaves the previous value in place.
///
/// # Example
///
/// ```ignore
/// let store = FileSessionStateStore::open(path).await?;
/// store.set("centerLat", Some(StateValue::Double(59.93))).await?;
/// ```
#[derive(Clone)]
pub struct FileSessionStateStore {
    /// Cached table loaded from storage.
    /// The mutex also serializes writers.
    state: Arc<Mutex<StateTable>>,
    file: Option<Arc<AtomicTomlFile<StateTable>>>,
}

impl FileSessionStateStore {
    pub async fn open(path: PathBuf) -> Result<Self> {
        let file = Arc::new(AtomicTomlFile::<StateTable>::new(path));

        let loader = file.clone();
        let initial = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| VarmapError::internal(format!("Failed to join task: {}", e)))??
            .unwrap_or_default();

        tracing::debug!(keys = initial.len(), "Loaded session state");

        Ok(Self {
            state: Arc::new(Mutex::new(initial)),
            file: Some(file),
        })
    }

    pub async fn open_default(base_dir: Option<&Path>) -> Result<Self> {
        let path = VarmapPaths::new(base_dir).get_path(ServiceType::SessionState)?;
        Self::open(path).await
    }

    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(StateTable::new())),
            file: None,
        }
    }

    async fn apply<'a, I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Option<StateValue>)>,
    {
        let mut state = self.state.lock().await;

        let mut next = state.clone();
        for (key, value) in entries {
            match value {
                Some(value) => {
                    next.insert(key.to_string(), value);
                }
                None => {
                    next.remove(key);
                }
            }
        }

        if let Some(file) = &self.file {
            let file = file.clone();
            let table = next.clone();
            tokio::task::spawn_blocking(move || file.save(&table))
                .await
                .map_err(|e| VarmapError::internal(format!("Failed to join task: {}", e)))??;
        }

        *state = next;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStateRepository for FileSessionStateStore {
    async fn get(&self, key: &str) -> Result<Option<StateValue>> {
        let state = self.state.lock().await;
        Ok(state.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Option<StateValue>) -> Result<()> {
        self.apply([(key, value)]).await
    }

    async fn set_many(&self, entries: Vec<StateEntry>) -> Result<()> {
        self.apply(entries).await
    }
}

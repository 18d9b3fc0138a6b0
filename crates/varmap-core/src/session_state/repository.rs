//! Session state repository trait.

use async_trait::async_trait;

use super::model::{StateEntry, StateValue};
use crate::error::Result;

/// Durable string-keyed store of primitive values.
#[async_trait]
pub trait SessionStateRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StateValue>>;

    /// Stores `value` under `key`. `None` removes the key.
    async fn set(&self, key: &str, value: Option<StateValue>) -> Result<()>;

    /// Applies several writes in one durable save.
    ///
    /// The default implementation falls back to one `set` per entry.
    async fn set_many(&self, entries: Vec<StateEntry>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }
}

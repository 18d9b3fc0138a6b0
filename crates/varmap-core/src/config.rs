use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://689ecf813fed484cf8780b5f.mockapi.io/api/v1/";

/// Floor for both pull intervals. Smaller configured values are raised to it.
pub const MIN_PULL_INTERVAL_MS: u64 = 1_000;

/// Settings for the synchronization core, stored in `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Base URL of the remote point service. `points` is resolved against it.
    pub base_url: String,
    /// Delay before each pull of the slow loop.
    pub slow_pull_interval_ms: u64,
    /// Delay after each pull of the fast loop.
    pub fast_pull_interval_ms: u64,
    /// Connect and request timeout at the transport boundary.
    pub request_timeout_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            slow_pull_interval_ms: 60_000,
            fast_pull_interval_ms: 10_000,
            request_timeout_ms: 20_000,
        }
    }
}

impl SyncSettings {
    pub fn slow_pull_interval(&self) -> Duration {
        Duration::from_millis(self.slow_pull_interval_ms.max(MIN_PULL_INTERVAL_MS))
    }

    pub fn fast_pull_interval(&self) -> Duration {
        Duration::from_millis(self.fast_pull_interval_ms.max(MIN_PULL_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

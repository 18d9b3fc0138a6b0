//! Configuration service implementation.
//!
//! Loads `SyncSettings` from `config.toml`, writing the defaults on first run,
//! and applies environment overrides.

use crate::paths::{ServiceType, VarmapPaths};
use crate::storage::AtomicTomlFile;
use std::path::{Path, PathBuf};
use varmap_core::config::SyncSettings;
use varmap_core::error::Result;

/// Overrides `base_url` when set.
pub const BASE_URL_ENV: &str = "VARMAP_BASE_URL";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(base_dir: Option<&Path>) -> Result<Self> {
        let path = VarmapPaths::new(base_dir).get_path(ServiceType::Config)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings file (creating it with defaults when missing) and
    /// applies `VARMAP_BASE_URL`.
    pub fn load(&self) -> Result<SyncSettings> {
        let settings = self.load_file()?;
        Ok(apply_env_override(settings, std::env::var(BASE_URL_ENV).ok()))
    }

    fn load_file(&self) -> Result<SyncSettings> {
        let file = AtomicTomlFile::<SyncSettings>::new(self.path.clone());
        match file.load()? {
            Some(settings) => Ok(settings),
            None => {
                let defaults = SyncSettings::default();
                file.save(&defaults)?;
                tracing::info!("Wrote default config to {}", self.path.display());
                Ok(defaults)
            }
        }
    }
}

fn apply_env_override(mut settings: SyncSettings, base_url: Option<String>) -> SyncSettings {
    if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
        tracing::debug!("Base URL overridden by {}", BASE_URL_ENV);
        settings.base_url = url;
    }
    settings
}

//! Unified path management for varmap files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/varmap/            # Config directory
//! └── config.toml              # SyncSettings
//!
//! ~/.local/share/varmap/       # Data directory
//! ├── points.toml              # Local point collection
//! └── session_state.toml       # Restart-durable UI state
//! ```
//!
//! With a base directory override every file lives directly under it.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "varmap";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for varmap_core::VarmapError {
    fn from(e: PathError) -> Self {
        varmap_core::VarmapError::config(e.to_string())
    }
}

/// Files managed by the infrastructure layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    Points,
    SessionState,
}

impl ServiceType {
    fn file_name(self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::Points => "points.toml",
            ServiceType::SessionState => "session_state.toml",
        }
    }
}

/// Resolves varmap file locations.
#[derive(Debug, Clone, Default)]
pub struct VarmapPaths {
    base_dir: Option<PathBuf>,
}

impl VarmapPaths {
    /// `base_dir` overrides the platform directories (tests, `--data-dir`).
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        let dir = match service {
            ServiceType::Config => self.config_dir()?,
            ServiceType::Points | ServiceType::SessionState => self.data_dir()?,
        };
        Ok(dir.join(service.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_override() {
        let base = PathBuf::from("/tmp/varmap-test");
        let paths = VarmapPaths::new(Some(&base));

        assert_eq!(
            paths.get_path(ServiceType::Points).unwrap(),
            base.join("points.toml")
        );
        assert_eq!(
            paths.get_path(ServiceType::SessionState).unwrap(),
            base.join("session_state.toml")
        );
        assert_eq!(
            paths.get_path(ServiceType::Config).unwrap(),
            base.join("config.toml")
        );
    }

    #[test]
    fn test_default_dirs_end_with_app_dir() {
        let paths = VarmapPaths::new(None);
        if let Ok(data_dir) = paths.data_dir() {
            assert!(data_dir.ends_with(APP_DIR));
        }
        if let Ok(config_file) = paths.get_path(ServiceType::Config) {
            assert!(config_file.ends_with("config.toml"));
        }
    }
}

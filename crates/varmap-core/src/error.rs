//! Error types for Varmap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Varmap workspace.
///
/// The first three variants form the failure taxonomy of the synchronization
/// core. None of them is fatal: each call site decides whether to surface the
/// failure (user-triggered operations) or log it and retry on the next tick
/// (background loops).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VarmapError {
    /// The remote could not be reached, timed out, or answered with a non-2xx status.
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// HTTP status code when the remote answered at all.
        status: Option<u16>,
    },

    /// A response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A durable write or read failed.
    #[error("Storage error: {format} - {message}")]
    Storage {
        format: String, // "TOML", "IO", ...
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VarmapError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error without a status code.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Creates a Network error for a non-2xx response.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Creates a Decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Creates a Storage error
    pub fn storage(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Returns the HTTP status attached to a Network error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VarmapError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            format: "IO".to_string(),
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VarmapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(format!("JSON: {}", err))
    }
}

impl From<toml::de::Error> for VarmapError {
    fn from(err: toml::de::Error) -> Self {
        Self::Storage {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for VarmapError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Storage {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for VarmapError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, VarmapError>`.
pub type Result<T> = std::result::Result<T, VarmapError>;

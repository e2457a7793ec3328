//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.
//!
//! Session operations never return this type; they turn failures into notices.
//! It is used while wiring the client together and by the command-line front end.

use crate::config::ConfigError;
use study_notes_core::ports::PortError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying HTTP library (e.g., building the client).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., creating the storage directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a JSON encoding error while printing results.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Error types for the nutri_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nutri_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external image analysis or MET lookup service failed
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// A durable-storage write exceeded the configured quota
    #[error("Storage quota exceeded: meal log needs {needed} bytes, quota is {quota}")]
    CapacityExceeded { needed: u64, quota: u64 },

    /// A share-link identifier has no matching meal
    #[error("Shared meal not found or link expired: {0}")]
    ShareNotFound(String),

    /// Required input missing before a derived computation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

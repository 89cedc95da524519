//! Error types for naming store operations.

use thiserror::Error;

/// Errors that can occur while reading or decoding a naming store.
///
/// Merging never fails: empty sources, null values and empty names are
/// skipped rather than reported.
#[derive(Debug, Error)]
pub enum NamingError {
    /// The requested name is not present in the store.
    #[error("name not found: {name}")]
    KeyNotFound { name: String },

    /// The JSON text could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON document root is not an object.
    #[error("expected a JSON object, found {kind}")]
    NotAnObject { kind: &'static str },

    /// A shared store's lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience type alias for naming store operations.
pub type Result<T> = std::result::Result<T, NamingError>;

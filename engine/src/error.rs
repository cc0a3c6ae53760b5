//! Error types for the replay engine.
//!
//! Matching itself never fails. These errors only come out of the helpers
//! that turn caller values into records and collections.

use thiserror::Error;

/// All possible errors from the replay engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("expected a JSON array of objects, got {0}")]
    NotAnArray(&'static str),

    #[error("collection item {index} is not an object: {got}")]
    InvalidItem { index: usize, got: &'static str },

    #[error("failed to serialize value: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

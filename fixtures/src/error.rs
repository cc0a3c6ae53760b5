//! Unified error handling for fixture recording and loading.

use std::path::PathBuf;

/// Fixture error type.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("fixture file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("\"{0}\" can't be empty")]
    EmptyArgument(&'static str),

    #[error("\"{}\" doesn't exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("data source error: {0}")]
    Source(String),

    #[error("Engine error: {0}")]
    Engine(#[from] replay_engine::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl FixtureError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixtureError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixtureError::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        FixtureError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for fixture operations.
pub type Result<T> = std::result::Result<T, FixtureError>;

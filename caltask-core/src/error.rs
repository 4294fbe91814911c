//! Error types for caltask operations.

use thiserror::Error;

/// Errors that can occur while syncing events into the task tracker.
#[derive(Error, Debug)]
pub enum CaltaskError {
    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for caltask operations.
pub type CaltaskResult<T> = Result<T, CaltaskError>;

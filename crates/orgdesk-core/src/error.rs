//! Error types for orgdesk collaborators

use thiserror::Error;

/// Error raised by a remote collaborator or by schema configuration
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for collaborator operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

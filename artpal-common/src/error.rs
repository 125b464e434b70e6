//! Common error types for artpal

use thiserror::Error;

/// Common result type for artpal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the configuration layer and the persistence gateway
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File could not be read
    #[error("IO error reading {}: {}", .path.display(), .source)]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid value handed to the gateway
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

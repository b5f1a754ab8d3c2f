//! Error types for the sync tool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API error: {0}")]
    Api(#[from] garmin_connect_client::GarminError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

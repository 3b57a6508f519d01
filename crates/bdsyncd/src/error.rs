//! Error types for bdsyncd

use thiserror::Error;

/// Daemon-level errors (configuration, files). Per-device failures are
/// `SyncError`s and end up in the result log instead.
#[derive(Error, Debug)]
pub enum BdSyncError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bdsyncd operations
pub type BdSyncResult<T> = std::result::Result<T, BdSyncError>;

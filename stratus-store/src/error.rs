//! Error types for the storage provider layer.

use thiserror::Error;

/// Result type for storage provider operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage provider operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid or missing configuration (connection string, container name).
    #[error("invalid storage configuration: {0}")]
    Config(String),

    /// The backing container/bucket does not exist or is unusable.
    #[error("container '{0}' is not available: {1}")]
    Container(String, String),

    /// An I/O failure from the underlying object store (network,
    /// permission, throttling). Never swallowed; propagated verbatim.
    #[error("storage operation failed: {0}")]
    Io(String),
}

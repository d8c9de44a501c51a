//! Error types for the session layer.

use stratus_model::ModelError;
use stratus_store::StoreError;
use thiserror::Error;

/// Result type for ORM operations.
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors that can occur in document-mapping operations.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Propagated storage provider failure. Batch operations stop at
    /// the first one; nothing already written is rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Model/path resolution failure.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Document (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `add` under the `Reject` conflict policy found a stored document
    /// for the key.
    #[error("entity '{type_name}' with key '{key}' already exists")]
    AlreadyExists { type_name: &'static str, key: String },

    /// `update` found no stored document for the key.
    #[error("entity '{type_name}' with key '{key}' does not exist")]
    DoesNotExist { type_name: &'static str, key: String },

    /// `single_or_default` matched more than one element.
    #[error("sequence contains more than one matching element")]
    MultipleMatches,

    /// A query used a shape this engine does not translate.
    #[error("query operation '{operation}' is not supported")]
    NotSupported { operation: &'static str },
}

//! Error types for the entity model layer.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or using the entity model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A blob name failed the active provider's naming rules.
    #[error("invalid blob name '{blob_name}' for entity type '{type_name}'")]
    InvalidBlobName {
        type_name: &'static str,
        blob_name: String,
    },

    /// A key argument was empty or whitespace-only.
    #[error("invalid key for entity type '{type_name}': key is empty")]
    InvalidKey { type_name: &'static str },

    /// An entity instance carries no usable key value.
    #[error("cannot persist entity '{type_name}' without a valid key value")]
    MissingKey { type_name: &'static str },

    /// An entity type cannot round-trip through the document serializer.
    #[error("entity type '{type_name}' is not serializable as a JSON document")]
    NotSerializable {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A type was used with a context it was never registered in.
    #[error("entity type '{type_name}' is not registered in the model")]
    NotRegistered { type_name: &'static str },
}

//! The entity contract.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A user-defined record type persisted as one JSON document per
/// instance.
///
/// Identity is the (type, key-value) pair. The key must be set by the
/// caller before the entity is added — there is no auto-generation.
/// An empty or whitespace-only key is treated as unset and fails path
/// resolution.
///
/// Implementors must round-trip through serde JSON; the model validator
/// checks this once at context build by serializing and deserializing a
/// default instance.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The primary key value of this instance.
    fn key(&self) -> String;

    /// Explicit collection blob name, overriding the derived
    /// hash-plus-type-name form. The override is still validated
    /// against the provider's naming rules at model build.
    fn blob_name() -> Option<&'static str> {
        None
    }
}

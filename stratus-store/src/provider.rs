//! Storage provider abstraction.
//!
//! Defines a common interface over cloud object stores. The ORM core
//! serializes entities itself and hands the provider raw JSON bytes, so
//! the trait stays object-safe and providers stay oblivious to entity
//! types.

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies which cloud object store a provider wraps, and therefore
/// which blob-naming rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudProviderKind {
    /// S3-compatible object storage (the reference provider).
    S3,
    /// In-process map-backed storage for tests and samples.
    Memory,
}

/// Abstract blob storage interface.
///
/// All operations are cooperative async I/O: no background threads, no
/// internal fan-out. Callers await each operation in issue order.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Returns the provider kind (selects the naming-rule set).
    fn kind(&self) -> CloudProviderKind;

    /// Writes `bytes` to `path`, overwriting any existing blob.
    async fn save(&self, path: &str, bytes: &[u8]) -> StoreResult<()>;

    /// Reads the blob at `path`. Returns `None` when the blob does not
    /// exist — absence is not an error.
    async fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Deletes the blob at `path`. Deleting a non-existent blob is a
    /// no-op, not an error.
    async fn delete(&self, path: &str) -> StoreResult<()>;

    /// Lists full blob paths under `prefix`.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Normalizes a raw name fragment into something the provider's
    /// naming rules accept.
    fn sanitize_blob_name(&self, raw: &str) -> String;

    /// Creates the backing container/bucket if it does not exist.
    async fn create_container_if_not_exists(&self) -> StoreResult<()>;

    /// Deletes the backing container/bucket and everything in it.
    async fn delete_container(&self) -> StoreResult<()>;
}

//! Storage configuration.

use crate::error::{StoreError, StoreResult};
use crate::CloudProviderKind;
use serde::{Deserialize, Serialize};

/// What `DocSet::add` does when the key already has a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnConflict {
    /// Fail with an already-exists error before writing (default).
    #[default]
    Reject,
    /// Overwrite the stored document unconditionally.
    Overwrite,
}

/// Immutable configuration for a storage context.
///
/// Supplied once at context construction and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageOptions {
    /// Which cloud provider backs the context.
    pub provider: CloudProviderKind,
    /// Provider connection string. For S3 this is the endpoint URL; an
    /// empty string falls back to the SDK's default endpoint resolution.
    pub connection_string: String,
    /// Container/bucket holding every collection of this context.
    pub container_name: String,
    /// Conflict policy for `add` on an existing key.
    #[serde(default)]
    pub on_conflict: OnConflict,
}

impl StorageOptions {
    /// Options for the in-memory provider, for tests and samples.
    pub fn memory(container_name: impl Into<String>) -> Self {
        Self {
            provider: CloudProviderKind::Memory,
            connection_string: String::new(),
            container_name: container_name.into(),
            on_conflict: OnConflict::default(),
        }
    }

    /// Options for an S3-compatible endpoint.
    pub fn s3(endpoint: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self {
            provider: CloudProviderKind::S3,
            connection_string: endpoint.into(),
            container_name: container_name.into(),
            on_conflict: OnConflict::default(),
        }
    }

    /// Sets the conflict policy for `add`.
    pub fn with_on_conflict(mut self, policy: OnConflict) -> Self {
        self.on_conflict = policy;
        self
    }

    /// Fails fast on configuration that cannot possibly work. Runs at
    /// context construction, before any storage I/O.
    pub fn validate(&self) -> StoreResult<()> {
        if self.container_name.trim().is_empty() {
            return Err(StoreError::Config("container name is empty".into()));
        }
        Ok(())
    }
}

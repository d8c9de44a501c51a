//! In-memory storage provider.
//!
//! Map-backed stand-in for a real object store, used by tests and
//! samples. Listing order is lexicographic by blob path, which is the
//! order S3-compatible stores return as well, so code exercised against
//! this provider sees production-shaped results.

use crate::error::{StoreError, StoreResult};
use crate::naming::sanitize_fragment;
use crate::provider::{CloudProviderKind, StorageProvider};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    created: bool,
    blobs: BTreeMap<String, Vec<u8>>,
}

/// In-process map-backed storage provider.
pub struct MemoryStorageProvider {
    container_name: String,
    state: RwLock<MemoryState>,
}

impl MemoryStorageProvider {
    /// Creates a provider for the named container. The container does
    /// not exist until `create_container_if_not_exists` runs.
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    fn not_created(&self) -> StoreError {
        StoreError::Container(self.container_name.clone(), "container not created".into())
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn kind(&self) -> CloudProviderKind {
        CloudProviderKind::Memory
    }

    async fn save(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.created {
            return Err(self.not_created());
        }
        debug!(path, len = bytes.len(), "memory save");
        state.blobs.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let state = self.state.read().await;
        if !state.created {
            return Err(self.not_created());
        }
        Ok(state.blobs.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if !state.created {
            return Err(self.not_created());
        }
        let existed = state.blobs.remove(path).is_some();
        debug!(path, existed, "memory delete");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let state = self.state.read().await;
        if !state.created {
            return Err(self.not_created());
        }
        Ok(state
            .blobs
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone())
            .collect())
    }

    fn sanitize_blob_name(&self, raw: &str) -> String {
        sanitize_fragment(raw)
    }

    async fn create_container_if_not_exists(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.created = true;
        Ok(())
    }

    async fn delete_container(&self) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.created = false;
        state.blobs.clear();
        Ok(())
    }
}

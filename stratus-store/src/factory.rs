//! Provider factory.

use crate::error::StoreResult;
use crate::memory::MemoryStorageProvider;
use crate::options::StorageOptions;
use crate::provider::{CloudProviderKind, StorageProvider};
use crate::s3::S3StorageProvider;
use std::sync::Arc;

/// Constructs the storage provider selected by `options.provider`.
///
/// Options are validated first, so a misconfigured context fails here
/// rather than on the first storage call.
pub async fn provider_for(options: &StorageOptions) -> StoreResult<Arc<dyn StorageProvider>> {
    options.validate()?;
    match options.provider {
        CloudProviderKind::Memory => Ok(Arc::new(MemoryStorageProvider::new(
            options.container_name.clone(),
        ))),
        CloudProviderKind::S3 => Ok(Arc::new(S3StorageProvider::connect(options).await?)),
    }
}

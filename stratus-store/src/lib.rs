//! Storage provider layer for Stratus.
//!
//! Everything above this crate deals in entities; everything here deals
//! in raw blobs. The `StorageProvider` trait is the seam: save/read/
//! delete/list over string paths, plus name sanitization and container
//! lifecycle. Two implementations ship in-tree — an in-memory provider
//! for tests and samples and an S3-compatible provider — and the naming
//! rules that blob names are validated against at model-build time.

mod error;
mod factory;
mod memory;
pub mod naming;
mod options;
mod provider;
mod s3;

pub use error::{StoreError, StoreResult};
pub use factory::provider_for;
pub use memory::MemoryStorageProvider;
pub use options::{OnConflict, StorageOptions};
pub use provider::{CloudProviderKind, StorageProvider};
pub use s3::S3StorageProvider;

//! Deterministic blob path resolution.
//!
//! Maps an entity type (and optionally a key) to the storage path of a
//! single document or the prefix of a whole collection. The derived
//! collection name hashes the fully-qualified type signature so two
//! generic instantiations of the same wrapper never collide, then
//! appends the sanitized lowercased type name for readability:
//!
//! `{hash8}-{type_name}/{urlencoded_key}.json`

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use sha2::{Digest, Sha256};
use std::any::type_name;
use std::sync::Arc;
use stratus_store::StorageProvider;

/// Resolves entity types and keys to blob paths.
///
/// Stateless apart from delegating name sanitization to the active
/// storage provider.
#[derive(Clone)]
pub struct BlobPathResolver {
    provider: Arc<dyn StorageProvider>,
}

impl BlobPathResolver {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// The collection blob name for `T`: the explicit override if the
    /// type declares one, else the derived hash-plus-name form. Pure in
    /// the type — stable across calls and across process restarts.
    pub fn blob_name<T: Entity>(&self) -> String {
        if let Some(name) = T::blob_name() {
            return name.trim().to_string();
        }

        let signature = type_name::<T>();
        let digest = Sha256::digest(signature.as_bytes());
        let hash = hex::encode(&digest[..4]);
        let short = short_type_name(signature);

        format!(
            "{}-{}",
            self.provider.sanitize_blob_name(&hash),
            self.provider.sanitize_blob_name(short)
        )
    }

    /// Path of the single document for `key`: `{blob_name}/{key}.json`
    /// with the key URL-encoded. Fails when the key is empty or
    /// whitespace-only.
    pub fn path_for_key<T: Entity>(&self, key: &str) -> ModelResult<String> {
        if key.trim().is_empty() {
            return Err(ModelError::InvalidKey {
                type_name: type_name::<T>(),
            });
        }
        Ok(format!(
            "{}/{}.json",
            self.blob_name::<T>(),
            urlencoding::encode(key)
        ))
    }

    /// Path of the document holding `entity`, extracted from its
    /// declared key. Fails when the instance carries no key value.
    pub fn path_for_entity<T: Entity>(&self, entity: &T) -> ModelResult<String> {
        let key = entity.key();
        if key.trim().is_empty() {
            return Err(ModelError::MissingKey {
                type_name: type_name::<T>(),
            });
        }
        Ok(format!(
            "{}/{}.json",
            self.blob_name::<T>(),
            urlencoding::encode(&key)
        ))
    }

    /// Collection prefix for `T`, with trailing separator.
    pub fn collection_prefix<T: Entity>(&self) -> String {
        format!("{}/", self.blob_name::<T>())
    }
}

/// Strips the module path from a type signature, keeping generic
/// arguments: `my_crate::module::Wrapper<other::Inner>` becomes
/// `Wrapper<other::Inner>`. The generic arguments keep their own paths;
/// sanitization flattens those into underscores.
fn short_type_name(signature: &str) -> &str {
    let head_end = signature.find('<').unwrap_or(signature.len());
    match signature[..head_end].rfind("::") {
        Some(idx) => &signature[idx + 2..],
        None => signature,
    }
}

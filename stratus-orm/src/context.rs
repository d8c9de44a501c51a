//! The storage context — session root.
//!
//! A context is a unit-of-work scope: it owns the provider connection,
//! the validated entity model and the change tracker. Model validation
//! runs during `build`, so naming and serializability mistakes fail the
//! context instead of the first operation. Contexts are cheap and
//! short-lived; they are not meant for concurrent mutation from
//! multiple threads.

use crate::database::StorageDatabase;
use crate::error::OrmResult;
use crate::set::DocSet;
use crate::tracker::ChangeTracker;
use std::sync::Arc;
use stratus_model::{BlobPathResolver, Entity, EntityModel, ModelBuilder, ModelValidator};
use stratus_store::{provider_for, StorageOptions};
use tracing::info;

/// Collects options and entity registrations, then builds a validated
/// context.
pub struct StorageContextBuilder {
    options: StorageOptions,
    model: ModelBuilder,
}

impl StorageContextBuilder {
    pub fn new(options: StorageOptions) -> Self {
        Self {
            options,
            model: ModelBuilder::new(),
        }
    }

    /// Registers an entity type with this context's model.
    pub fn register<T: Entity + Default>(mut self) -> Self {
        self.model = self.model.register::<T>();
        self
    }

    /// Validates configuration and model, connects the provider and
    /// ensures the container exists.
    pub async fn build(self) -> OrmResult<StorageContext> {
        let provider = provider_for(&self.options).await?;
        let resolver = BlobPathResolver::new(Arc::clone(&provider));

        let model = self.model.build(&resolver);
        ModelValidator::new(provider.kind()).validate(&model)?;

        provider.create_container_if_not_exists().await?;

        let tracker = Arc::new(ChangeTracker::new());
        let database = Arc::new(StorageDatabase::new(provider, resolver, tracker));

        info!(
            container = %self.options.container_name,
            entity_types = model.len(),
            "storage context ready"
        );
        Ok(StorageContext {
            options: self.options,
            model,
            database,
        })
    }
}

/// Session over one container: per-entity document sets, pending-change
/// flushing and container lifecycle.
pub struct StorageContext {
    options: StorageOptions,
    model: EntityModel,
    database: Arc<StorageDatabase>,
}

impl StorageContext {
    pub fn builder(options: StorageOptions) -> StorageContextBuilder {
        StorageContextBuilder::new(options)
    }

    /// The document set for `T`. Fails when `T` was never registered
    /// with this context.
    pub fn docs<T: Entity>(&self) -> OrmResult<DocSet<T>> {
        self.model.descriptor_of::<T>()?;
        Ok(DocSet::new(
            Arc::clone(&self.database),
            self.options.on_conflict,
        ))
    }

    /// Flushes pending tracked changes; returns the number persisted.
    pub async fn save_changes(&self) -> OrmResult<usize> {
        self.database.save_changes().await
    }

    /// Creates the backing container if missing.
    pub async fn ensure_created(&self) -> OrmResult<()> {
        self.database
            .provider()
            .create_container_if_not_exists()
            .await?;
        Ok(())
    }

    /// Deletes the backing container and everything in it.
    pub async fn ensure_deleted(&self) -> OrmResult<()> {
        self.database.provider().delete_container().await?;
        Ok(())
    }

    pub fn options(&self) -> &StorageOptions {
        &self.options
    }

    pub fn model(&self) -> &EntityModel {
        &self.model
    }

    /// The context's identity map.
    pub fn tracker(&self) -> &Arc<ChangeTracker> {
        self.database.tracker()
    }
}

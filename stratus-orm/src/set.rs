//! Per-entity document set.
//!
//! The façade combining identity-keyed CRUD with the tracking and query
//! machinery. Every mutation is write-through: the storage call is
//! awaited before the method returns, so operations issued sequentially
//! by one caller land in issue order.

use crate::database::StorageDatabase;
use crate::error::{OrmError, OrmResult};
use crate::query::Query;
use crate::tracker::EntityState;
use std::marker::PhantomData;
use std::sync::Arc;
use stratus_model::Entity;
use stratus_store::OnConflict;
use tracing::debug;

/// Entity-type-scoped repository handle. Cheap to clone; obtained from
/// `StorageContext::docs`.
pub struct DocSet<T: Entity> {
    database: Arc<StorageDatabase>,
    on_conflict: OnConflict,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for DocSet<T> {
    fn clone(&self) -> Self {
        Self {
            database: Arc::clone(&self.database),
            on_conflict: self.on_conflict,
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> DocSet<T> {
    pub(crate) fn new(database: Arc<StorageDatabase>, on_conflict: OnConflict) -> Self {
        Self {
            database,
            on_conflict,
            _marker: PhantomData,
        }
    }

    /// Adds a new entity. The key must already be set by the caller —
    /// there is no auto-generation. Under `OnConflict::Reject` (the
    /// default) an existing stored document fails with already-exists
    /// *before* anything is written; under `Overwrite` the stored
    /// document is replaced unconditionally.
    ///
    /// Returns the tracked handle for the instance.
    pub async fn add(&self, entity: T) -> OrmResult<Arc<T>> {
        let path = self.database.resolver().path_for_entity(&entity)?;

        if self.on_conflict == OnConflict::Reject
            && self.database.provider().read(&path).await?.is_some()
        {
            return Err(OrmError::AlreadyExists {
                type_name: std::any::type_name::<T>(),
                key: entity.key(),
            });
        }

        let bytes = serde_json::to_vec(&entity)?;
        self.database.provider().save(&path, &bytes).await?;
        debug!(path = %path, "added entity");

        let instance = Arc::new(entity);
        let tracker = self.database.tracker();
        tracker.evict::<T>(&instance.key());
        // Already persisted, so the entry settles as Unchanged —
        // save_changes must not write it a second time.
        tracker.track(Arc::clone(&instance), path, EntityState::Unchanged);
        Ok(instance)
    }

    /// Looks up an entity by key. A tracked non-detached instance is
    /// returned without a storage round-trip; otherwise the document is
    /// read, attached and returned. A storage miss is `Ok(None)`, never
    /// an error.
    pub async fn find(&self, key: &str) -> OrmResult<Option<Arc<T>>> {
        let tracker = self.database.tracker();
        if let Some(tracked) = tracker.find_tracked::<T>(key) {
            return Ok(Some(tracked));
        }

        let path = self.database.resolver().path_for_key::<T>(key)?;
        let Some(bytes) = self.database.provider().read(&path).await? else {
            return Ok(None);
        };
        let entity: T = serde_json::from_slice(&bytes)?;
        let instance = Arc::new(entity);

        tracker.evict::<T>(key);
        tracker.track(Arc::clone(&instance), path, EntityState::Unchanged);
        Ok(Some(instance))
    }

    /// Overwrites an existing entity. Updating a key with no stored
    /// document fails with does-not-exist and performs no write.
    pub async fn update(&self, entity: T) -> OrmResult<Arc<T>> {
        let path = self.database.resolver().path_for_entity(&entity)?;

        if self.database.provider().read(&path).await?.is_none() {
            return Err(OrmError::DoesNotExist {
                type_name: std::any::type_name::<T>(),
                key: entity.key(),
            });
        }

        let bytes = serde_json::to_vec(&entity)?;
        self.database.provider().save(&path, &bytes).await?;
        debug!(path = %path, "updated entity");

        let instance = Arc::new(entity);
        let tracker = self.database.tracker();
        tracker.evict::<T>(&instance.key());
        tracker.track(Arc::clone(&instance), path, EntityState::Modified);
        Ok(instance)
    }

    /// Deletes the entity's document (idempotent) and detaches every
    /// tracked entry with the same identity, so a later `find` cannot
    /// resurrect the entity from the identity map.
    pub async fn remove(&self, entity: &Arc<T>) -> OrmResult<()> {
        let key = entity.key();
        let path = self.database.resolver().path_for_entity(entity.as_ref())?;
        let tracker = self.database.tracker();

        // Mark intent before the delete: if the storage call fails the
        // entry stays Deleted and save_changes retries it.
        match tracker.find_entry_by_ptr(entity) {
            Some(id) => tracker.set_state(id, EntityState::Deleted),
            None => {
                tracker.track(Arc::clone(entity), path.clone(), EntityState::Deleted);
            }
        }

        self.database.provider().delete(&path).await?;
        tracker.evict::<T>(&key);
        debug!(path = %path, "removed entity");
        Ok(())
    }

    /// Tracks an instance as `Unchanged` without any storage I/O.
    pub fn attach(&self, entity: T) -> OrmResult<Arc<T>> {
        let path = self.database.resolver().path_for_entity(&entity)?;
        let instance = Arc::new(entity);
        let tracker = self.database.tracker();
        tracker.evict::<T>(&instance.key());
        tracker.track(Arc::clone(&instance), path, EntityState::Unchanged);
        Ok(instance)
    }

    /// Materializes the whole collection in storage listing order.
    pub async fn to_list(&self) -> OrmResult<Vec<Arc<T>>> {
        self.database.to_list::<T>().await
    }

    /// Query root supporting the constrained query algebra.
    pub fn query(&self) -> Query<T> {
        Query::new(Arc::clone(&self.database))
    }

    // Bulk variants: sequential application of the singular operation.
    // The first failure aborts the remainder; items already applied
    // stay applied.

    pub async fn add_range(
        &self,
        entities: impl IntoIterator<Item = T>,
    ) -> OrmResult<Vec<Arc<T>>> {
        let mut added = Vec::new();
        for entity in entities {
            added.push(self.add(entity).await?);
        }
        Ok(added)
    }

    pub async fn update_range(
        &self,
        entities: impl IntoIterator<Item = T>,
    ) -> OrmResult<Vec<Arc<T>>> {
        let mut updated = Vec::new();
        for entity in entities {
            updated.push(self.update(entity).await?);
        }
        Ok(updated)
    }

    pub async fn remove_range(
        &self,
        entities: impl IntoIterator<Item = Arc<T>>,
    ) -> OrmResult<()> {
        for entity in entities {
            self.remove(&entity).await?;
        }
        Ok(())
    }

    pub fn attach_range(&self, entities: impl IntoIterator<Item = T>) -> OrmResult<Vec<Arc<T>>> {
        let mut attached = Vec::new();
        for entity in entities {
            attached.push(self.attach(entity)?);
        }
        Ok(attached)
    }
}

//! Persistence orchestration.
//!
//! `StorageDatabase` owns the provider, the path resolver and the
//! change tracker, and implements the two storage-facing batch
//! operations: flushing pending changes and materializing a collection.
//! All I/O is sequential awaited calls — no fan-out, so a full
//! collection read costs O(n) round-trips by design.

use crate::error::OrmResult;
use crate::query::{CompiledQuery, QueryShape};
use crate::tracker::{ChangeTracker, EntityState};
use std::sync::Arc;
use stratus_model::{BlobPathResolver, Entity};
use stratus_store::StorageProvider;
use tracing::{debug, info};

pub struct StorageDatabase {
    provider: Arc<dyn StorageProvider>,
    resolver: BlobPathResolver,
    tracker: Arc<ChangeTracker>,
}

impl StorageDatabase {
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        resolver: BlobPathResolver,
        tracker: Arc<ChangeTracker>,
    ) -> Self {
        Self {
            provider,
            resolver,
            tracker,
        }
    }

    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn resolver(&self) -> &BlobPathResolver {
        &self.resolver
    }

    pub fn tracker(&self) -> &Arc<ChangeTracker> {
        &self.tracker
    }

    /// Persists every pending (Added/Modified/Deleted) entry, in
    /// insertion order. Per entry: reconcile stale same-identity
    /// entries, re-check the entry survived, then dispatch the write or
    /// delete. Returns the number of entries actually dispatched —
    /// entries skipped by reconciliation or detached underneath are
    /// no-ops, not failures.
    ///
    /// A storage failure aborts the remaining batch; entries already
    /// persisted stay persisted (no rollback).
    pub async fn save_changes(&self) -> OrmResult<usize> {
        let ops = self.tracker.pending_ops();
        let mut count = 0usize;

        for op in ops {
            self.tracker.reconcile_around(op.id);

            // The entry may have been detached by the caller (or by the
            // reconciliation of a later duplicate) since the snapshot.
            let Some(state) = self.tracker.state_of(op.id) else {
                continue;
            };
            match state {
                EntityState::Added | EntityState::Modified => {
                    let bytes = (op.to_bytes)()?;
                    self.provider.save(&op.blob_path, &bytes).await?;
                    self.tracker.set_state(op.id, EntityState::Unchanged);
                    debug!(path = %op.blob_path, type_name = op.type_name, "persisted entity");
                }
                EntityState::Deleted => {
                    self.provider.delete(&op.blob_path).await?;
                    self.tracker.detach(op.id);
                    debug!(path = %op.blob_path, type_name = op.type_name, "deleted entity");
                }
                EntityState::Unchanged | EntityState::Detached => continue,
            }
            count += 1;
        }

        if count > 0 {
            info!(count, "save_changes persisted entries");
        }
        Ok(count)
    }

    /// Materializes the full collection of `T`: list the prefix, read
    /// and deserialize each blob sequentially, attach every instance to
    /// the tracker as `Unchanged` — evicting any stale tracked copy of
    /// the same key first, so no duplicate identity survives the list.
    ///
    /// Results come back in storage listing order. A blob that vanishes
    /// between the list and its read is skipped.
    pub async fn to_list<T: Entity>(&self) -> OrmResult<Vec<Arc<T>>> {
        let prefix = self.resolver.collection_prefix::<T>();
        let paths = self.provider.list(&prefix).await?;
        debug!(prefix = %prefix, blobs = paths.len(), "materializing collection");

        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(bytes) = self.provider.read(&path).await? else {
                continue;
            };
            let entity: T = serde_json::from_slice(&bytes)?;
            let instance = Arc::new(entity);

            self.tracker.evict::<T>(&instance.key());
            self.tracker
                .track(Arc::clone(&instance), path, EntityState::Unchanged);
            items.push(instance);
        }
        Ok(items)
    }

    /// Compiles a query shape into a deferred callable. Nothing touches
    /// storage until the compiled query is invoked.
    pub fn compile_query<T: Entity>(self: &Arc<Self>, shape: QueryShape<T>) -> CompiledQuery<T> {
        CompiledQuery::new(Arc::clone(self), shape)
    }
}

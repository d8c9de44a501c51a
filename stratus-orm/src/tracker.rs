//! Change tracking.
//!
//! A self-contained identity map scoped to one context: each tracked
//! entry associates a live `Arc` instance with a lifecycle state and
//! its resolved blob path. Several entries may transiently share one
//! logical identity (same type, same key) — e.g. a mutated copy still
//! tracked while a fresh read attaches another instance. Reconciliation
//! restores the invariant that at most one non-detached entry per
//! identity survives a save or list.
//!
//! The tracker is built for unit-of-work discipline: one context, one
//! logical thread of control. The mutex is never held across an await.

use std::any::{Any, TypeId};
use std::sync::{Arc, Mutex};
use stratus_model::Entity;
use tracing::debug;

/// Lifecycle state of a tracked entity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
    Unchanged,
    Detached,
}

impl EntityState {
    /// States that `save_changes` dispatches storage operations for.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Added | Self::Modified | Self::Deleted)
    }
}

type SerializeFn = Arc<dyn Fn() -> Result<Vec<u8>, serde_json::Error> + Send + Sync>;

struct TrackedEntry {
    id: u64,
    type_id: TypeId,
    type_name: &'static str,
    key: String,
    blob_path: String,
    state: EntityState,
    instance: Arc<dyn Any + Send + Sync>,
    to_bytes: SerializeFn,
}

impl TrackedEntry {
    /// Thin pointer of the instance allocation, for same-instance checks.
    fn instance_ptr(&self) -> *const () {
        Arc::as_ptr(&self.instance) as *const ()
    }
}

/// A snapshot of one pending entry, taken before dispatching storage
/// operations so the tracker lock is not held across I/O.
pub(crate) struct PendingOp {
    pub id: u64,
    pub blob_path: String,
    pub type_name: &'static str,
    pub key: String,
    pub to_bytes: SerializeFn,
}

#[derive(Default)]
struct TrackerInner {
    next_id: u64,
    entries: Vec<TrackedEntry>,
}

/// Session-scoped identity map.
#[derive(Default)]
pub struct ChangeTracker {
    inner: Mutex<TrackerInner>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Tracks `instance` with the given state; returns the entry id.
    pub fn track<T: Entity>(
        &self,
        instance: Arc<T>,
        blob_path: String,
        state: EntityState,
    ) -> u64 {
        let key = instance.key();
        let captured = Arc::clone(&instance);
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(TrackedEntry {
            id,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            key,
            blob_path,
            state,
            instance,
            to_bytes: Arc::new(move || serde_json::to_vec(&*captured)),
        });
        id
    }

    /// First non-detached instance of `T` with the given key.
    pub fn find_tracked<T: Entity>(&self, key: &str) -> Option<Arc<T>> {
        let inner = self.lock();
        inner
            .entries
            .iter()
            .find(|e| {
                e.type_id == TypeId::of::<T>() && e.state != EntityState::Detached && e.key == key
            })
            .and_then(|e| Arc::clone(&e.instance).downcast::<T>().ok())
    }

    /// Entry id of this exact instance, if tracked and not detached.
    pub fn find_entry_by_ptr<T: Entity>(&self, instance: &Arc<T>) -> Option<u64> {
        let ptr = Arc::as_ptr(instance) as *const ();
        let inner = self.lock();
        inner
            .entries
            .iter()
            .find(|e| e.state != EntityState::Detached && e.instance_ptr() == ptr)
            .map(|e| e.id)
    }

    pub fn state_of(&self, id: u64) -> Option<EntityState> {
        let inner = self.lock();
        inner.entries.iter().find(|e| e.id == id).map(|e| e.state)
    }

    pub fn set_state(&self, id: u64, state: EntityState) {
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.iter_mut().find(|e| e.id == id) {
            entry.state = state;
        }
    }

    pub fn detach(&self, id: u64) {
        self.set_state(id, EntityState::Detached);
    }

    /// Detaches every *older* non-detached entry sharing the winner's
    /// identity (type + key) but holding a different instance — the
    /// newer entry wins. Returns the ids of the evicted entries.
    pub fn reconcile_around(&self, winner_id: u64) -> Vec<u64> {
        let mut inner = self.lock();
        let Some(winner) = inner.entries.iter().find(|e| e.id == winner_id) else {
            return Vec::new();
        };
        let (type_id, key, ptr, type_name) = (
            winner.type_id,
            winner.key.clone(),
            winner.instance_ptr(),
            winner.type_name,
        );

        let mut evicted = Vec::new();
        for entry in inner.entries.iter_mut() {
            if entry.id < winner_id
                && entry.type_id == type_id
                && entry.state != EntityState::Detached
                && entry.key == key
                && entry.instance_ptr() != ptr
            {
                entry.state = EntityState::Detached;
                evicted.push(entry.id);
            }
        }
        if !evicted.is_empty() {
            debug!(type_name, key = %key, evicted = evicted.len(), "reconciled stale tracked entries");
        }
        evicted
    }

    /// Detaches every non-detached entry of `T` with the given key.
    /// Used right before attaching a freshly read or written instance,
    /// so the newcomer becomes the single tracked copy.
    pub fn evict<T: Entity>(&self, key: &str) -> Vec<u64> {
        let mut inner = self.lock();
        let type_id = TypeId::of::<T>();
        let mut evicted = Vec::new();
        for entry in inner.entries.iter_mut() {
            if entry.type_id == type_id && entry.state != EntityState::Detached && entry.key == key
            {
                entry.state = EntityState::Detached;
                evicted.push(entry.id);
            }
        }
        if !evicted.is_empty() {
            debug!(key = %key, evicted = evicted.len(), "evicted stale tracked entries");
        }
        evicted
    }

    /// Snapshot of Added/Modified/Deleted entries in insertion order.
    pub(crate) fn pending_ops(&self) -> Vec<PendingOp> {
        let inner = self.lock();
        inner
            .entries
            .iter()
            .filter(|e| e.state.is_pending())
            .map(|e| PendingOp {
                id: e.id,
                blob_path: e.blob_path.clone(),
                type_name: e.type_name,
                key: e.key.clone(),
                to_bytes: Arc::clone(&e.to_bytes),
            })
            .collect()
    }

    /// Number of non-detached entries (all types).
    pub fn tracked_count(&self) -> usize {
        let inner = self.lock();
        inner
            .entries
            .iter()
            .filter(|e| e.state != EntityState::Detached)
            .count()
    }

    /// Number of non-detached entries of `T` with the given key. The
    /// reconciliation invariant keeps this at most 1 after a save or
    /// list.
    pub fn tracked_count_for<T: Entity>(&self, key: &str) -> usize {
        let inner = self.lock();
        let type_id = TypeId::of::<T>();
        inner
            .entries
            .iter()
            .filter(|e| {
                e.type_id == type_id && e.state != EntityState::Detached && e.key == key
            })
            .count()
    }
}

use serde::{Deserialize, Serialize};
use stratus_orm::{
    Entity, OnConflict, OrmError, StorageContext, StorageOptions, StoreError,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct User {
    id: String,
    name: String,
}

impl User {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Entity for User {
    fn key(&self) -> String {
        self.id.clone()
    }
}

async fn make_context() -> StorageContext {
    StorageContext::builder(StorageOptions::memory("test-container"))
        .register::<User>()
        .build()
        .await
        .unwrap()
}

async fn make_context_with(policy: OnConflict) -> StorageContext {
    StorageContext::builder(StorageOptions::memory("test-container").with_on_conflict(policy))
        .register::<User>()
        .build()
        .await
        .unwrap()
}

// ── Add / Find ───────────────────────────────────────────────────

#[tokio::test]
async fn add_then_find() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users.add(User::new("u1", "John")).await.unwrap();

    let found = users.find("u1").await.unwrap().unwrap();
    assert_eq!(found.name, "John");
}

#[tokio::test]
async fn find_miss_is_none_not_error() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();
    assert!(users.find("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn find_prefers_tracked_instance() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let added = users.add(User::new("u1", "John")).await.unwrap();
    let found = users.find("u1").await.unwrap().unwrap();

    // Same instance, no storage round-trip produced a second copy.
    assert!(std::sync::Arc::ptr_eq(&added, &found));
}

#[tokio::test]
async fn find_survives_fresh_context() {
    // A second context over the same provider state would need a shared
    // provider; instead verify the same context re-reads after detach
    // via a plain storage-backed find of an entity added elsewhere.
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();
    users.add(User::new("u9", "Ada")).await.unwrap();

    let listed = users.to_list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Ada");
}

#[tokio::test]
async fn add_without_key_fails_fast() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let err = users.add(User::new("  ", "NoKey")).await.unwrap_err();
    assert!(matches!(err, OrmError::Model(_)), "got: {err}");
}

// ── Conflict policy ──────────────────────────────────────────────

#[tokio::test]
async fn duplicate_add_rejected_by_default() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users.add(User::new("u1", "first")).await.unwrap();
    let err = users.add(User::new("u1", "second")).await.unwrap_err();
    assert!(matches!(err, OrmError::AlreadyExists { .. }), "got: {err}");

    // The rejection happened before the write: storage still holds the
    // first document.
    let found = users.find("u1").await.unwrap().unwrap();
    assert_eq!(found.name, "first");
}

#[tokio::test]
async fn duplicate_add_overwrites_when_configured() {
    let context = make_context_with(OnConflict::Overwrite).await;
    let users = context.docs::<User>().unwrap();

    users.add(User::new("u1", "first")).await.unwrap();
    users.add(User::new("u1", "second")).await.unwrap();

    let found = users.find("u1").await.unwrap().unwrap();
    assert_eq!(found.name, "second");

    let listed = users.to_list().await.unwrap();
    assert_eq!(listed.len(), 1);
}

// ── Update ───────────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_document() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users.add(User::new("u1", "before")).await.unwrap();
    users.update(User::new("u1", "after")).await.unwrap();

    let found = users.find("u1").await.unwrap().unwrap();
    assert_eq!(found.name, "after");
}

#[tokio::test]
async fn update_missing_fails_without_writing() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let err = users.update(User::new("missing", "x")).await.unwrap_err();
    assert!(matches!(err, OrmError::DoesNotExist { .. }), "got: {err}");

    // No document appeared as a side effect.
    assert!(users.find("missing").await.unwrap().is_none());
    assert!(users.to_list().await.unwrap().is_empty());
}

// ── Remove ───────────────────────────────────────────────────────

#[tokio::test]
async fn list_after_delete_excludes_removed() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users.add(User::new("a", "x")).await.unwrap();
    users.add(User::new("b", "y")).await.unwrap();

    let a = users.find("a").await.unwrap().unwrap();
    users.remove(&a).await.unwrap();

    let listed = users.to_list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "b");
}

#[tokio::test]
async fn remove_untracked_instance_still_deletes() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users.add(User::new("u1", "John")).await.unwrap();

    // A separate instance with the same key, never tracked. The add
    // above left its own tracked entry; remove must evict that one too,
    // or find would serve the deleted entity from the identity map.
    let loose = std::sync::Arc::new(User::new("u1", "John"));
    users.remove(&loose).await.unwrap();

    assert!(users.find("u1").await.unwrap().is_none());
    assert!(users.to_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_evicts_the_tracked_handle_itself() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let added = users.add(User::new("u1", "John")).await.unwrap();
    users.remove(&added).await.unwrap();

    assert!(users.find("u1").await.unwrap().is_none());
    assert_eq!(context.tracker().tracked_count(), 0);
}

#[tokio::test]
async fn remove_is_idempotent_at_storage_level() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let added = users.add(User::new("u1", "John")).await.unwrap();
    users.remove(&added).await.unwrap();
    // Removing again deletes a non-existent blob: not an error.
    users.remove(&added).await.unwrap();
}

// ── Attach ───────────────────────────────────────────────────────

#[tokio::test]
async fn attach_tracks_without_storage_io() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users.attach(User::new("u1", "ghost")).unwrap();

    // Tracked, so find returns it without a document existing.
    assert!(users.find("u1").await.unwrap().is_some());
    // But storage has nothing.
    assert!(users.to_list().await.unwrap().is_empty());
}

// ── Bulk variants ────────────────────────────────────────────────

#[tokio::test]
async fn add_range_applies_sequentially() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let added = users
        .add_range(vec![User::new("a", "1"), User::new("b", "2"), User::new("c", "3")])
        .await
        .unwrap();
    assert_eq!(added.len(), 3);
    assert_eq!(users.to_list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn add_range_aborts_at_first_failure_keeping_applied() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();
    users.add(User::new("b", "existing")).await.unwrap();

    let err = users
        .add_range(vec![User::new("a", "1"), User::new("b", "dup"), User::new("c", "3")])
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::AlreadyExists { .. }));

    // "a" was applied before the failure; "c" never ran.
    let mut ids: Vec<_> = users
        .to_list()
        .await
        .unwrap()
        .iter()
        .map(|u| u.id.clone())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn remove_range_clears_collection() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    users
        .add_range(vec![User::new("a", "1"), User::new("b", "2")])
        .await
        .unwrap();
    let all = users.to_list().await.unwrap();
    users.remove_range(all).await.unwrap();

    assert!(users.to_list().await.unwrap().is_empty());
}

#[tokio::test]
async fn opaque_random_keys_round_trip() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();

    let keys: Vec<String> = (0..5).map(|_| uuid::Uuid::new_v4().to_string()).collect();
    for key in &keys {
        users.add(User::new(key, "gen")).await.unwrap();
    }

    for key in &keys {
        assert!(users.find(key).await.unwrap().is_some(), "lost key {key}");
    }
    assert_eq!(users.to_list().await.unwrap().len(), keys.len());
}

// ── Context-level errors ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Unregistered {
    id: String,
}

impl Entity for Unregistered {
    fn key(&self) -> String {
        self.id.clone()
    }
}

#[tokio::test]
async fn docs_for_unregistered_type_fails() {
    let context = make_context().await;
    let err = context.docs::<Unregistered>().err().unwrap();
    assert!(matches!(err, OrmError::Model(_)), "got: {err}");
}

#[tokio::test]
async fn builder_rejects_empty_container() {
    let err = StorageContext::builder(StorageOptions::memory(""))
        .register::<User>()
        .build()
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OrmError::Store(StoreError::Config(_))));
}

#[tokio::test]
async fn ensure_deleted_drops_collection() {
    let context = make_context().await;
    let users = context.docs::<User>().unwrap();
    users.add(User::new("u1", "John")).await.unwrap();

    context.ensure_deleted().await.unwrap();
    context.ensure_created().await.unwrap();

    assert!(users.to_list().await.unwrap().is_empty());
}

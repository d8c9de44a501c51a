//! Document-object mapping over cloud blob storage.
//!
//! Persists typed entities as individually addressable JSON blobs
//! (`{collection}/{key}.json`) behind an ORM-shaped interface: tracked
//! document sets, an identity map with reconciliation, and a small
//! materialize-then-filter query algebra.
//!
//! Deliberately out of scope: real transactions (saves are not atomic
//! across entries), server-side filtering, schema migration and
//! relational joins. One flat collection per type, one document per
//! instance.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use stratus_orm::{Entity, StorageContext, StorageOptions};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct User {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     fn key(&self) -> String {
//!         self.id.clone()
//!     }
//! }
//!
//! # async fn demo() -> Result<(), stratus_orm::OrmError> {
//! let context = StorageContext::builder(StorageOptions::memory("app-data"))
//!     .register::<User>()
//!     .build()
//!     .await?;
//!
//! let users = context.docs::<User>()?;
//! users.add(User { id: "u1".into(), name: "John".into() }).await?;
//! let found = users.find("u1").await?;
//! assert!(found.is_some());
//! # Ok(())
//! # }
//! ```

mod context;
mod database;
mod error;
mod query;
mod set;
mod tracker;

pub use context::{StorageContext, StorageContextBuilder};
pub use database::StorageDatabase;
pub use error::{OrmError, OrmResult};
pub use query::{CompiledQuery, Predicate, Query, QueryOutcome, QueryShape};
pub use set::DocSet;
pub use tracker::{ChangeTracker, EntityState};

pub use stratus_model::{Entity, ModelError};
pub use stratus_store::{CloudProviderKind, OnConflict, StorageOptions, StoreError};

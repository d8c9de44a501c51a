//! Query translation.
//!
//! The engine supports exactly four shapes over a single collection:
//! enumerate-all, first-or-default, single-or-default (each with an
//! optional predicate) and async enumeration. Every shape translates to
//! the same plan: list the collection prefix, read and deserialize each
//! blob, then filter in memory. Predicates are ordinary closures that
//! capture their environment by value, so they can run against
//! materialized objects with nothing else kept alive.
//!
//! Recognized-but-untranslatable operations (ordering, paging) poison
//! the query and fail fast at execution, naming the operation — no
//! silent fallback.

use crate::database::StorageDatabase;
use crate::error::{OrmError, OrmResult};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use stratus_model::Entity;
use tracing::debug;

/// An in-memory predicate over materialized entities.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// The query shapes the engine translates.
pub enum QueryShape<T> {
    /// Materialize the whole collection.
    All,
    /// First element satisfying the predicate (or first overall).
    First(Option<Predicate<T>>),
    /// The at-most-one element satisfying the predicate; more than one
    /// match is an error.
    Single(Option<Predicate<T>>),
}

/// The result of invoking a compiled query.
pub enum QueryOutcome<T> {
    Sequence(Vec<Arc<T>>),
    Scalar(Option<Arc<T>>),
}

impl<T> QueryOutcome<T> {
    pub fn into_sequence(self) -> Vec<Arc<T>> {
        match self {
            Self::Sequence(items) => items,
            Self::Scalar(Some(item)) => vec![item],
            Self::Scalar(None) => Vec::new(),
        }
    }

    pub fn into_scalar(self) -> Option<Arc<T>> {
        match self {
            Self::Scalar(item) => item,
            Self::Sequence(items) => items.into_iter().next(),
        }
    }
}

/// A deferred query: holds its shape and the database, touches storage
/// only when invoked.
pub struct CompiledQuery<T: Entity> {
    database: Arc<StorageDatabase>,
    shape: QueryShape<T>,
}

impl<T: Entity> CompiledQuery<T> {
    pub(crate) fn new(database: Arc<StorageDatabase>, shape: QueryShape<T>) -> Self {
        Self { database, shape }
    }

    /// Materializes the collection and applies the shape.
    pub async fn invoke(&self) -> OrmResult<QueryOutcome<T>> {
        let items = self.database.to_list::<T>().await?;
        debug!(loaded = items.len(), "query materialized collection");

        match &self.shape {
            QueryShape::All => Ok(QueryOutcome::Sequence(items)),
            QueryShape::First(predicate) => {
                let first = match predicate {
                    Some(p) => items.into_iter().find(|item| p(item)),
                    None => items.into_iter().next(),
                };
                Ok(QueryOutcome::Scalar(first))
            }
            QueryShape::Single(predicate) => {
                let mut matches = items.into_iter().filter(|item| match predicate {
                    Some(p) => p(item),
                    None => true,
                });
                let first = matches.next();
                if matches.next().is_some() {
                    return Err(OrmError::MultipleMatches);
                }
                Ok(QueryOutcome::Scalar(first))
            }
        }
    }
}

/// Query root over one entity collection.
///
/// `filter` calls compose with logical AND. Terminal operations
/// (`to_list`, `first_or_default`, `single_or_default`, `stream`)
/// compile and invoke the query.
pub struct Query<T: Entity> {
    database: Arc<StorageDatabase>,
    predicate: Option<Predicate<T>>,
    rejected: Option<&'static str>,
}

impl<T: Entity> Query<T> {
    pub(crate) fn new(database: Arc<StorageDatabase>) -> Self {
        Self {
            database,
            predicate: None,
            rejected: None,
        }
    }

    /// Adds a predicate; composes with any previous one.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(previous) => Box::new(move |item| previous(item) && predicate(item)),
            None => Box::new(predicate),
        });
        self
    }

    /// Ordering is not translated — storage listing order is the only
    /// order. Recorded here so execution fails fast naming the shape.
    pub fn order_by<K, F: Fn(&T) -> K>(mut self, _key: F) -> Self {
        self.rejected.get_or_insert("order_by");
        self
    }

    /// Paging is not translated.
    pub fn skip(mut self, _n: usize) -> Self {
        self.rejected.get_or_insert("skip");
        self
    }

    /// Paging is not translated.
    pub fn take(mut self, _n: usize) -> Self {
        self.rejected.get_or_insert("take");
        self
    }

    fn guard(&self) -> OrmResult<()> {
        match self.rejected {
            Some(operation) => Err(OrmError::NotSupported { operation }),
            None => Ok(()),
        }
    }

    /// Materializes the collection and applies the predicate.
    pub async fn to_list(self) -> OrmResult<Vec<Arc<T>>> {
        self.guard()?;
        let compiled = self.database.compile_query(QueryShape::All);
        let items = compiled.invoke().await?.into_sequence();
        Ok(match self.predicate {
            Some(p) => items.into_iter().filter(|item| p(item)).collect(),
            None => items,
        })
    }

    /// First match in storage listing order, or `None`.
    pub async fn first_or_default(self) -> OrmResult<Option<Arc<T>>> {
        self.guard()?;
        let compiled = self
            .database
            .compile_query(QueryShape::First(self.predicate));
        Ok(compiled.invoke().await?.into_scalar())
    }

    /// The single match, `None` when nothing matches, an error when
    /// more than one element matches.
    pub async fn single_or_default(self) -> OrmResult<Option<Arc<T>>> {
        self.guard()?;
        let compiled = self
            .database
            .compile_query(QueryShape::Single(self.predicate));
        Ok(compiled.invoke().await?.into_scalar())
    }

    /// Async enumeration. The full collection is loaded before the
    /// first item is yielded (no streaming from storage); items then
    /// yield cooperatively one at a time.
    pub async fn stream(self) -> OrmResult<BoxStream<'static, Arc<T>>> {
        let items = self.to_list().await?;
        Ok(futures::stream::iter(items).boxed())
    }
}

//! Document store used by the storefront.
//!
//! # Collections
//!
//! - `assortment` - The product catalog
//! - `cart` - The single shared cart
//!
//! Both are plain collections of JSON documents accessed through
//! [`DocumentCollection`]. Two backends implement it:
//!
//! - [`PgCollection`] - `PostgreSQL` tables with a `JSONB` document column
//! - [`MemoryCollection`] - process-local, for development and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p smokeshop-cli -- migrate
//! ```

mod memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::Value;
use smokeshop_core::{Filter, FindOptions, Update};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use memory::MemoryCollection;
pub use postgres::PgCollection;

/// A stored record: a JSON object.
pub type Document = Value;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store refused the query (negative skip, invalid pattern, ...).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A stored record could not be decoded into the expected shape.
    #[error("failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of an `update_one` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    /// Documents that matched the filter (0 or 1).
    pub matched: u64,
    /// Documents whose content actually changed.
    pub modified: u64,
}

/// Documents returned by `find`, in result order.
#[derive(Debug, Default)]
pub struct Cursor {
    documents: std::vec::IntoIter<Document>,
}

impl Cursor {
    /// Wrap already-fetched documents.
    #[must_use]
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: documents.into_iter(),
        }
    }
}

impl Iterator for Cursor {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

/// A collection of JSON documents.
///
/// Semantics shared by every backend:
/// - With no sort, documents come back in insertion order.
/// - Sorting ranks values by type (absent/null, numbers, strings, booleans)
///   and then by value; ties keep insertion order.
/// - `limit == 0` means no limit; a negative limit counts as its absolute value.
/// - A negative `skip` or an invalid brand pattern fails with
///   [`StoreError::InvalidQuery`].
pub trait DocumentCollection: Send + Sync {
    /// Find documents matching `filter`, then sort, skip and limit them.
    fn find(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> impl Future<Output = Result<Cursor, StoreError>> + Send;

    /// Find the first document matching `filter` in natural order.
    fn find_one(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Insert one document.
    fn insert_one(&self, document: Document)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete the first document matching `filter`. Returns the number deleted.
    fn delete_one(&self, filter: &Filter) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Delete every document matching `filter`. Returns the number deleted.
    fn delete_many(&self, filter: &Filter)
    -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Apply `update` to the first document matching `filter`.
    fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;

    /// Check that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// A collection on whichever backend the service was configured with.
#[derive(Clone)]
pub enum Collection {
    Postgres(PgCollection),
    Memory(MemoryCollection),
}

impl DocumentCollection for Collection {
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Cursor, StoreError> {
        match self {
            Self::Postgres(c) => c.find(filter, options).await,
            Self::Memory(c) => c.find(filter, options).await,
        }
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>, StoreError> {
        match self {
            Self::Postgres(c) => c.find_one(filter).await,
            Self::Memory(c) => c.find_one(filter).await,
        }
    }

    async fn insert_one(&self, document: Document) -> Result<(), StoreError> {
        match self {
            Self::Postgres(c) => c.insert_one(document).await,
            Self::Memory(c) => c.insert_one(document).await,
        }
    }

    async fn delete_one(&self, filter: &Filter) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(c) => c.delete_one(filter).await,
            Self::Memory(c) => c.delete_one(filter).await,
        }
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(c) => c.delete_many(filter).await,
            Self::Memory(c) => c.delete_many(filter).await,
        }
    }

    async fn update_one(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome, StoreError> {
        match self {
            Self::Postgres(c) => c.update_one(filter, update).await,
            Self::Memory(c) => c.update_one(filter, update).await,
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(c) => c.ping().await,
            Self::Memory(c) => c.ping().await,
        }
    }
}

impl From<PgCollection> for Collection {
    fn from(collection: PgCollection) -> Self {
        Self::Postgres(collection)
    }
}

impl From<MemoryCollection> for Collection {
    fn from(collection: MemoryCollection) -> Self {
        Self::Memory(collection)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Normalize a `limit` to the number of documents to return, `None` for no limit.
pub(crate) const fn effective_limit(limit: i64) -> Option<u64> {
    match limit {
        0 => None,
        n => Some(n.unsigned_abs()),
    }
}

/// Reject a negative skip before it reaches a backend.
pub(crate) fn checked_skip(skip: i64) -> Result<u64, StoreError> {
    u64::try_from(skip)
        .map_err(|_| StoreError::InvalidQuery(format!("skip must be non-negative (got {skip})")))
}

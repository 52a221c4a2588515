//! Trait definitions for the search engine's external collaborators.
//!
//! These traits enable dependency injection and easy testing through mocking.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::types::{BusRecord, IndexQuery, TermsAggregation, TermsBucket};

/// Error type for search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

/// Error from the cache backend.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CacheError(pub String);

/// Error from the index backend.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error from the event bus consumer.
#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Key/value store with per-entry TTL.
///
/// Values are opaque byte payloads; callers own serialization. Entries may be
/// evicted at any time, so nothing stored here is authoritative.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`, replacing any previous entry and resetting
    /// its lifetime to `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// A document index queryable by full-text match, range filter, sort and
/// terms aggregation.
///
/// All operations accept an index name that may be a physical index or an
/// alias; the engine addresses documents through aliases only.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Creates a physical index with the given mapping.
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), IndexError>;

    /// Returns the current mapping of `index`.
    async fn mapping(&self, index: &str) -> Result<Value, IndexError>;

    async fn index_exists(&self, index: &str) -> Result<bool, IndexError>;

    async fn delete_index(&self, index: &str) -> Result<(), IndexError>;

    /// Upserts a document under `id`. Indexing the same id twice replaces the
    /// previous document.
    async fn put_document(&self, index: &str, id: &str, document: &Value) -> Result<(), IndexError>;

    /// Removes a document. Returns false when no document with `id` existed.
    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, IndexError>;

    /// Executes a query and returns the matching documents' source bodies.
    async fn search(&self, index: &str, query: &IndexQuery) -> Result<Vec<Value>, IndexError>;

    /// Runs a terms aggregation and returns its buckets in backend order.
    async fn aggregate_terms(
        &self,
        index: &str,
        aggregation: &TermsAggregation,
    ) -> Result<Vec<TermsBucket>, IndexError>;

    /// Resolves an alias to the physical indices it points at, or `None` when
    /// the alias does not exist.
    async fn aliased_indices(&self, alias: &str) -> Result<Option<Vec<String>>, IndexError>;

    async fn put_alias(&self, index: &str, alias: &str) -> Result<(), IndexError>;

    async fn delete_alias(&self, index: &str, alias: &str) -> Result<(), IndexError>;

    /// Server-side copy of all documents from `source` into `dest`, returning
    /// once the copy has completed.
    async fn reindex(&self, source: &str, dest: &str) -> Result<(), IndexError>;
}

/// Subscription-based consumer of bus records.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Returns the records received since the last poll, waiting at most
    /// `timeout` when none are pending.
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<BusRecord>, ConsumerError>;

    /// Releases the consumer's bus resources. Called once on shutdown.
    async fn close(&mut self) -> Result<(), ConsumerError>;
}

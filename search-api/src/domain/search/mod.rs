//! Search over products and orders with versioned cache invalidation.
//!
//! This module keeps a search index in sync with the rest of the platform
//! and serves cached queries against it:
//!
//! - **Versioned invalidation**: every cached query key embeds the owning
//!   scope's version token; a single bump after a mutation invalidates all
//!   cached queries for that scope without touching individual keys.
//! - **Event-driven indexing**: a background loop consumes product and order
//!   events from the bus and applies them to the index.
//! - **Online schema migration**: at startup the expected mapping is
//!   reconciled against the live one; an outdated index is rebuilt behind its
//!   alias with zero downtime.
//!
//! # Architecture
//!
//! External collaborators are abstracted behind traits for testability:
//!
//! - [`CacheStore`] - byte-level cache with per-entry TTL (Moka, mocks)
//! - [`SearchIndex`] - document index operations (Elasticsearch, mocks)
//! - [`EventConsumer`] - bus subscription (Kafka REST proxy, mocks)
//!
//! # Example
//!
//! ```ignore
//! use search_api::domain::search::{ensure_indices, SearchRepository, SortOrder};
//!
//! let index = ElasticIndex::new(ElasticClient::new("http://localhost:9200"));
//! ensure_indices(&index).await?;
//!
//! let repository = SearchRepository::new(Arc::new(index), Arc::new(MokaStore::new(10_000)));
//! let hits = repository.search("keyboard", None, Some(100.0), SortOrder::PriceAsc).await?;
//! ```

mod bootstrap;
mod events;
mod keys;
mod query_cache;
mod repository;
mod synchronizer;
mod traits;
mod types;
mod version;

pub mod cache;
pub mod index;
pub mod source;

// Re-export main types
pub use bootstrap::ensure_indices;
pub use repository::SearchRepository;
pub use synchronizer::{run_synchronizer, SyncConfig, TOPICS};
pub use traits::{CacheError, SearchError};
pub use types::{PopularProduct, ProductDocument, SortOrder};

//! Typed read/write layer over the cache store.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::traits::CacheStore;

/// Wraps query results in JSON and absorbs every cache failure.
///
/// Caching is a performance optimization, never a correctness dependency:
/// backend or decode failures are logged and reported as a miss (reads) or
/// skipped entirely (writes).
#[derive(Clone)]
pub struct QueryCache {
    store: Arc<dyn CacheStore>,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Returns the value cached under `key`, or `None` on miss, decode
    /// failure or backend failure.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "cached value did not decode, treating as miss");
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl`.
    pub async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "value did not serialize for caching");
                return;
            }
        };

        if let Err(e) = self.store.set(key, bytes, ttl).await {
            warn!(key, error = %e, "cache write failed, skipping");
        }
    }
}

//! Cache store backed by an in-process moka cache.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{sync::Cache, Expiry};

use crate::domain::search::traits::{CacheError, CacheStore, Result};

/// Stored value plus the lifetime it was written with; moka reads the TTL
/// back out through the [`Expiry`] policy.
#[derive(Clone)]
struct Entry {
    bytes: Vec<u8>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-wide key/value store with per-entry TTL.
///
/// Lives and dies with the process; a restart loses version tokens, which
/// the registry treats as first use.
#[derive(Clone)]
pub struct MokaStore {
    cache: Cache<String, Entry>,
}

impl MokaStore {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.cache.get(key).map(|entry| entry.bytes))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.cache
            .insert(key.to_string(), Entry { bytes: value, ttl });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key);
        Ok(())
    }
}

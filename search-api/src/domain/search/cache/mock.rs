//! Mock cache store for testing.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::search::traits::{CacheError, CacheStore, Result};

/// Mock cache store backed by an in-memory HashMap.
///
/// TTLs are accepted and ignored; entries live until deleted. Reads and
/// writes can be made to fail for exercising degradation paths.
#[derive(Clone, Default)]
pub struct MockCacheStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail.
    pub fn with_failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Make every subsequent `set` and `delete` fail.
    pub fn with_failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Get the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Raw entry access (for test assertions).
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Overwrite an entry without going through the trait (for seeding
    /// stale state).
    pub fn seed(&self, key: &str, value: Vec<u8>) {
        self.entries.write().unwrap().insert(key.to_string(), value);
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError("simulated read failure".to_string()));
        }
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError("simulated write failure".to_string()));
        }
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError("simulated write failure".to_string()));
        }
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let store = MockCacheStore::new();

        store
            .set("k", b"v".to_vec(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);

        store.delete("k").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn failing_reads_error() {
        let store = MockCacheStore::new().with_failing_reads();
        assert!(store.get("k").await.is_err());
    }

    #[tokio::test]
    async fn failing_writes_error() {
        let store = MockCacheStore::new().with_failing_writes();
        assert!(store
            .set("k", b"v".to_vec(), Duration::from_secs(1))
            .await
            .is_err());
        assert!(store.delete("k").await.is_err());
    }
}

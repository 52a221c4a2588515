//! Version token registry, backed by the cache store.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use super::keys;
use super::traits::{CacheError, CacheStore, Result};
use super::types::Scope;

/// Lifetime of a version entry that never gets bumped. A missing entry is
/// first use, so eviction only costs one cold read per scope.
const VERSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Maps an invalidation scope to its current opaque version token.
///
/// Tokens are random and never reused; bumping installs a fresh one, which
/// changes every cache key derived from it without touching stored entries.
#[derive(Clone)]
pub struct VersionRegistry {
    cache: Arc<dyn CacheStore>,
}

impl VersionRegistry {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Returns the live token for `scope`, minting and persisting one on
    /// first use.
    ///
    /// Concurrent first use may mint more than once; whichever write lands
    /// last wins, and every minted token is valid cache-key material in the
    /// meantime.
    pub async fn get_version(&self, scope: Scope) -> Result<String, CacheError> {
        let key = keys::version_key(scope);
        if let Some(bytes) = self.cache.get(&key).await? {
            match String::from_utf8(bytes) {
                Ok(token) => return Ok(token),
                Err(_) => warn!(%scope, "discarding non-utf8 version token"),
            }
        }

        let token = mint_token();
        self.cache
            .set(&key, token.clone().into_bytes(), VERSION_TTL)
            .await?;
        Ok(token)
    }

    /// Unconditionally installs a fresh token for `scope`, invalidating every
    /// cached query derived from the previous one.
    pub async fn bump_version(&self, scope: Scope) -> Result<(), CacheError> {
        let key = keys::version_key(scope);
        self.cache
            .set(&key, mint_token().into_bytes(), VERSION_TTL)
            .await
    }
}

fn mint_token() -> String {
    Uuid::new_v4().simple().to_string()
}

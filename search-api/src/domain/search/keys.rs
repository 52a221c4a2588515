//! Cache key derivation.
//!
//! Query keys embed the scope's current version token, so a version bump
//! changes every derived key and stale entries are simply never read again.

use sha2::{Digest, Sha256};

use super::types::{Scope, SortOrder};

/// Key under which a scope's current version token lives.
pub fn version_key(scope: Scope) -> String {
    format!("cache:ver:{}", scope)
}

/// Key for a product search result set.
///
/// The parameter string has a fixed field order and fixed bound rendering so
/// semantically identical queries always hash identically.
pub fn search_key(
    version: &str,
    q: &str,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sorting: SortOrder,
) -> String {
    let normalized = format!(
        "v={}|q={}|min={}|max={}|sort={}",
        version,
        q,
        render_bound(min_price),
        render_bound(max_price),
        sorting
    );

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("cache:search:products:{:x}", hasher.finalize())
}

/// Key for the popular-products aggregation at a given size.
pub fn popular_key(version: &str, size: usize) -> String {
    format!("cache:agg:popular-products:v={}:size={}", version, size)
}

fn render_bound(bound: Option<f64>) -> String {
    match bound {
        Some(value) => format!("{:?}", value),
        None => "*".to_string(),
    }
}

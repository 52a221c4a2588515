//! Cached repository over the search index.
//!
//! Every read goes through the version-keyed query cache and every mutation
//! bumps the owning scope's version, so a single write invalidates all cached
//! queries for that scope at once.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::keys;
use super::query_cache::QueryCache;
use super::traits::{CacheStore, Result, SearchError, SearchIndex};
use super::types::{
    IndexQuery, IndexedDocument, PopularProduct, ProductDocument, RangeFilter, Scope, SortDirection,
    SortOrder, SortSpec, TermsAggregation, TermsBucket, TextMatch,
};
use super::version::VersionRegistry;

/// Maximum number of hits a search returns.
const RESULT_LIMIT: usize = 20;
/// TTL backstop for cached query results.
const QUERY_TTL: Duration = Duration::from_secs(60);

/// The only component that talks to the search index.
///
/// Reads are cache-aside: the cache key embeds the owning scope's current
/// version token, so entries written before the last mutation can never be
/// served again even though they are still physically present until their
/// TTL runs out.
pub struct SearchRepository {
    index: Arc<dyn SearchIndex>,
    versions: VersionRegistry,
    cache: QueryCache,
}

impl SearchRepository {
    pub fn new(index: Arc<dyn SearchIndex>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            index,
            versions: VersionRegistry::new(cache.clone()),
            cache: QueryCache::new(cache),
        }
    }

    /// Upsert a document into its scope's index, then invalidate the scope.
    ///
    /// The version bump only happens after the index write succeeds, so a
    /// rejected write leaves existing cache entries valid.
    pub async fn index<D: IndexedDocument>(&self, document: &D) -> Result<()> {
        let raw = serde_json::to_value(document)?;
        self.index
            .put_document(D::SCOPE.as_str(), document.id(), &raw)
            .await?;
        self.versions.bump_version(D::SCOPE).await?;
        debug!(scope = %D::SCOPE, id = document.id(), "indexed document");
        Ok(())
    }

    /// Remove a document by id, then invalidate the scope.
    ///
    /// Deleting an absent id is not an error; the return value reports
    /// whether a document was actually removed.
    pub async fn delete<D: IndexedDocument>(&self, id: &str) -> Result<bool> {
        let removed = self.index.delete_document(D::SCOPE.as_str(), id).await?;
        self.versions.bump_version(D::SCOPE).await?;
        debug!(scope = %D::SCOPE, id, removed, "deleted document");
        Ok(removed)
    }

    /// Full-text product search with an optional price window.
    ///
    /// An empty query text matches every product within the price window.
    pub async fn search(
        &self,
        query: &str,
        min_price: Option<f64>,
        max_price: Option<f64>,
        sorting: SortOrder,
    ) -> Result<Vec<ProductDocument>> {
        if let Some(min) = min_price {
            if min < 0.0 {
                return Err(SearchError::Validation(
                    "minPrice must not be negative".to_string(),
                ));
            }
        }
        if let Some(max) = max_price {
            if max < 0.0 {
                return Err(SearchError::Validation(
                    "maxPrice must not be negative".to_string(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(SearchError::Validation(
                    "minPrice must not exceed maxPrice".to_string(),
                ));
            }
        }

        let key = self
            .cache_key(Scope::Products, |version| {
                keys::search_key(version, query, min_price, max_price, sorting)
            })
            .await;
        if let Some(key) = &key {
            if let Some(hit) = self.cache.read::<Vec<ProductDocument>>(key).await {
                debug!(%key, "serving search from cache");
                return Ok(hit);
            }
        }

        let trimmed = query.trim();
        let text = (!trimmed.is_empty()).then(|| TextMatch {
            query: trimmed.to_string(),
            fields: vec!["name".to_string(), "description".to_string()],
        });
        let range = (min_price.is_some() || max_price.is_some()).then(|| RangeFilter {
            field: "price".to_string(),
            gte: min_price,
            lte: max_price,
        });
        let index_query = IndexQuery {
            text,
            range,
            sort: Some(sort_spec(sorting)),
            size: RESULT_LIMIT,
        };

        let hits = self
            .index
            .search(Scope::Products.as_str(), &index_query)
            .await?;
        let products = hits
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ProductDocument>, _>>()?;

        if let Some(key) = &key {
            self.cache.write(key, &products, QUERY_TTL).await;
        }
        Ok(products)
    }

    /// The `size` most ordered products, ranked by total quantity across all
    /// orders.
    pub async fn popular(&self, size: usize) -> Result<Vec<PopularProduct>> {
        let key = self
            .cache_key(Scope::Orders, |version| keys::popular_key(version, size))
            .await;
        if let Some(key) = &key {
            if let Some(hit) = self.cache.read::<Vec<PopularProduct>>(key).await {
                debug!(%key, "serving popular products from cache");
                return Ok(hit);
            }
        }

        let aggregation = TermsAggregation {
            field: "productId".to_string(),
            size,
            sum_field: "quantity".to_string(),
            top_hit_source: vec!["productName".to_string()],
        };
        let buckets = self
            .index
            .aggregate_terms(Scope::Orders.as_str(), &aggregation)
            .await?;
        let products: Vec<PopularProduct> = buckets.into_iter().map(to_popular).collect();

        // An empty aggregation usually means the index has no orders yet.
        // Caching it would hide the first real orders for a full TTL.
        if !products.is_empty() {
            if let Some(key) = &key {
                self.cache.write(key, &products, QUERY_TTL).await;
            }
        }
        Ok(products)
    }

    /// Compute the version-scoped cache key, or `None` when the version
    /// lookup fails and the query should bypass the cache entirely.
    async fn cache_key(&self, scope: Scope, build: impl Fn(&str) -> String) -> Option<String> {
        match self.versions.get_version(scope).await {
            Ok(version) => Some(build(&version)),
            Err(e) => {
                warn!(%scope, error = %e, "version lookup failed, bypassing the query cache");
                None
            }
        }
    }
}

fn sort_spec(sorting: SortOrder) -> SortSpec {
    let (field, direction) = match sorting {
        SortOrder::NameAsc => ("name.kw", SortDirection::Asc),
        SortOrder::NameDsc => ("name.kw", SortDirection::Desc),
        SortOrder::PriceAsc => ("price", SortDirection::Asc),
        SortOrder::PriceDsc => ("price", SortDirection::Desc),
    };
    SortSpec {
        field: field.to_string(),
        direction,
    }
}

fn to_popular(bucket: TermsBucket) -> PopularProduct {
    let product_name = bucket
        .top_hit
        .as_ref()
        .and_then(|hit| hit.get("productName"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    PopularProduct {
        product_id: bucket.key,
        product_name,
        orders_count: bucket.total,
    }
}

//! Startup reconciliation of index schemas.
//!
//! Each logical index is reachable through a stable alias while the physical
//! index behind it carries a version suffix. When the live mapping predates
//! the expected one, a new physical index is created, filled via reindex and
//! swapped in behind the alias, so readers never observe a missing index.

use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::traits::{IndexError, Result, SearchIndex};

struct IndexSpec {
    alias: &'static str,
    /// JSON pointer that exists in the live mapping iff it is current.
    marker: &'static str,
    mapping: Value,
}

fn index_specs() -> Vec<IndexSpec> {
    vec![
        IndexSpec {
            alias: "products",
            marker: "/properties/name/fields/kw",
            mapping: json!({
                "properties": {
                    "id": { "type": "keyword" },
                    "name": {
                        "type": "text",
                        "fields": {
                            "kw": { "type": "keyword", "ignore_above": 256 }
                        }
                    },
                    "description": { "type": "text" },
                    "price": { "type": "double" },
                    "stock": { "type": "integer" },
                    "sellerId": { "type": "keyword" }
                }
            }),
        },
        IndexSpec {
            alias: "orders",
            marker: "/properties/productName/fields/kw",
            mapping: json!({
                "properties": {
                    "id": { "type": "keyword" },
                    "productId": { "type": "keyword" },
                    "productName": {
                        "type": "text",
                        "fields": {
                            "kw": { "type": "keyword", "ignore_above": 256 }
                        }
                    },
                    "userId": { "type": "keyword" },
                    "price": { "type": "double" },
                    "sellerId": { "type": "keyword" },
                    "address": { "type": "text" },
                    "postalCode": { "type": "keyword" },
                    "quantity": { "type": "integer" }
                }
            }),
        },
    ]
}

/// Bring every index in line with its expected mapping.
///
/// Idempotent: a repeated run against an up-to-date cluster does nothing.
/// Any error aborts the remaining indices and should be treated as fatal by
/// the caller.
pub async fn ensure_indices(index: &dyn SearchIndex) -> Result<(), IndexError> {
    for spec in index_specs() {
        ensure_index(index, &spec).await?;
    }
    Ok(())
}

async fn ensure_index(index: &dyn SearchIndex, spec: &IndexSpec) -> Result<(), IndexError> {
    if let Some(indices) = index.aliased_indices(spec.alias).await? {
        if let Some(current) = indices.first() {
            let mapping = index.mapping(current).await?;
            if mapping.pointer(spec.marker).is_some() {
                debug!(alias = spec.alias, index = %current, "index mapping is current");
                return Ok(());
            }
            return migrate(index, spec, current, false).await;
        }
    }

    // No alias. Either a legacy deployment left a physical index under the
    // alias name, or this is a fresh cluster.
    if index.index_exists(spec.alias).await? {
        return migrate(index, spec, spec.alias, true).await;
    }

    let initial = format!("{}-v1", spec.alias);
    info!(alias = spec.alias, index = %initial, "creating index");
    index.create_index(&initial, &spec.mapping).await?;
    index.put_alias(&initial, spec.alias).await?;
    Ok(())
}

/// Build a fresh physical index, copy `source` into it and move the alias
/// over. A legacy source that occupies the alias name must be deleted before
/// the alias can be attached.
async fn migrate(
    index: &dyn SearchIndex,
    spec: &IndexSpec,
    source: &str,
    delete_source: bool,
) -> Result<(), IndexError> {
    let target = format!(
        "{}-v{}",
        spec.alias,
        OffsetDateTime::now_utc().unix_timestamp()
    );
    info!(alias = spec.alias, source, target = %target, "migrating index to a new mapping");

    index.create_index(&target, &spec.mapping).await?;
    index.reindex(source, &target).await?;
    if delete_source {
        index.delete_index(source).await?;
    } else {
        index.delete_alias(source, spec.alias).await?;
    }
    index.put_alias(&target, spec.alias).await?;

    info!(alias = spec.alias, index = %target, "index migration finished");
    Ok(())
}

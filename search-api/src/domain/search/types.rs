//! Core types for the search domain.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Invalidation scope owning a set of indexed documents.
///
/// Each scope has exactly one live version token at a time, and the scope
/// name doubles as the index alias the documents live under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Products,
    Orders,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Products => "products",
            Scope::Orders => "orders",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order for product search, as accepted on the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDsc,
    PriceAsc,
    PriceDsc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SortOrder::NameAsc => "NameAsc",
            SortOrder::NameDsc => "NameDsc",
            SortOrder::PriceAsc => "PriceAsc",
            SortOrder::PriceDsc => "PriceDsc",
        };
        f.write_str(name)
    }
}

/// A document type the engine knows how to index.
///
/// Implementors are denormalized projections of upstream entities; the scope
/// ties the document to the alias it lives under and the version that is
/// bumped when it changes.
pub trait IndexedDocument: Serialize + Send + Sync {
    const SCOPE: Scope;

    /// Upstream entity id, used as the document id in the index.
    fn id(&self) -> &str;
}

/// Searchable projection of an upstream product.
///
/// Producers serialize their entities with PascalCase property names; the
/// aliases accept that casing while the index stores camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Description")]
    pub description: String,
    #[serde(alias = "Price")]
    pub price: f64,
    #[serde(alias = "Stock")]
    pub stock: i32,
    #[serde(alias = "SellerId")]
    pub seller_id: String,
}

impl IndexedDocument for ProductDocument {
    const SCOPE: Scope = Scope::Products;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Searchable projection of an upstream order, kept for the popular-products
/// aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "ProductId")]
    pub product_id: String,
    #[serde(alias = "ProductName")]
    pub product_name: String,
    #[serde(alias = "UserId")]
    pub user_id: String,
    #[serde(alias = "Price")]
    pub price: f64,
    #[serde(alias = "SellerId")]
    pub seller_id: String,
    #[serde(alias = "Address")]
    pub address: String,
    #[serde(alias = "PostalCode")]
    pub postal_code: String,
    #[serde(alias = "Quantity")]
    pub quantity: i32,
}

impl IndexedDocument for OrderDocument {
    const SCOPE: Scope = Scope::Orders;

    fn id(&self) -> &str {
        &self.id
    }
}

/// One row of the popular-products aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularProduct {
    pub product_id: String,
    pub product_name: String,
    /// Summed ordered quantity across all orders for this product.
    pub orders_count: f64,
}

/// Full-text match over one or more fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub query: String,
    pub fields: Vec<String>,
}

/// Numeric range filter; `None` bounds leave that side open.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub field: String,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// A query against the search index, independent of any backend syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub text: Option<TextMatch>,
    pub range: Option<RangeFilter>,
    pub sort: Option<SortSpec>,
    pub size: usize,
}

/// Terms aggregation grouping documents by `field`, ordered descending by the
/// sum of `sum_field`, carrying one top hit per bucket restricted to
/// `top_hit_source`.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAggregation {
    pub field: String,
    pub size: usize,
    pub sum_field: String,
    pub top_hit_source: Vec<String>,
}

/// One bucket of a terms aggregation result.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsBucket {
    pub key: String,
    pub total: f64,
    pub top_hit: Option<Value>,
}

/// A raw record read from the event bus.
#[derive(Debug, Clone)]
pub struct BusRecord {
    pub topic: String,
    pub value: Value,
}

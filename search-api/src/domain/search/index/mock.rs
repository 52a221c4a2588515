//! Mock search index for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::search::traits::{IndexError, Result, SearchIndex};
use crate::domain::search::types::{IndexQuery, SortDirection, TermsAggregation, TermsBucket};

#[derive(Default)]
struct StoredIndex {
    mapping: Value,
    documents: BTreeMap<String, Value>,
}

#[derive(Default)]
struct IndexState {
    indices: HashMap<String, StoredIndex>,
    /// alias name -> physical index name
    aliases: HashMap<String, String>,
}

impl IndexState {
    /// Resolves a name the way the backend would: physical indices win,
    /// then aliases.
    fn resolve(&self, name: &str) -> Option<String> {
        if self.indices.contains_key(name) {
            return Some(name.to_string());
        }
        self.aliases.get(name).cloned()
    }
}

/// Mock search index backed by in-memory maps.
///
/// Names resolve through aliases like the real backend, documents are flat
/// JSON objects, and search applies a simplified version of the query model:
/// substring text matching, numeric range filtering and single-field sorting
/// (a `.kw` suffix sorts on the underlying field).
#[derive(Clone, Default)]
pub struct MockSearchIndex {
    state: Arc<RwLock<IndexState>>,
    search_calls: Arc<AtomicUsize>,
    aggregate_calls: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a physical index with the given mapping.
    pub fn with_index(self, name: &str, mapping: Value) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state.indices.insert(
                name.to_string(),
                StoredIndex {
                    mapping,
                    documents: BTreeMap::new(),
                },
            );
        }
        self
    }

    /// Point an alias at an index. The target is not validated, so tests can
    /// seed a dangling alias.
    pub fn with_alias(self, alias: &str, index: &str) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state.aliases.insert(alias.to_string(), index.to_string());
        }
        self
    }

    /// Seed a document into an existing index (or alias).
    pub fn with_document(self, index: &str, id: &str, document: Value) -> Self {
        {
            let mut state = self.state.write().unwrap();
            let physical = state.resolve(index).expect("seeding into unknown index");
            state
                .indices
                .get_mut(&physical)
                .expect("seeding into unknown index")
                .documents
                .insert(id.to_string(), document);
        }
        self
    }

    /// Make every subsequent document write fail.
    pub fn with_failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Get a document by index (or alias) and id, for test assertions.
    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        let state = self.state.read().unwrap();
        let physical = state.resolve(index)?;
        state.indices.get(&physical)?.documents.get(id).cloned()
    }

    /// Number of documents in an index (or behind an alias).
    pub fn document_count(&self, index: &str) -> usize {
        let state = self.state.read().unwrap();
        state
            .resolve(index)
            .and_then(|physical| state.indices.get(&physical))
            .map(|stored| stored.documents.len())
            .unwrap_or(0)
    }

    /// All physical index names, sorted.
    pub fn index_names(&self) -> Vec<String> {
        let state = self.state.read().unwrap();
        let mut names: Vec<String> = state.indices.keys().cloned().collect();
        names.sort();
        names
    }

    /// The physical index an alias points at, if any.
    pub fn alias_target(&self, alias: &str) -> Option<String> {
        self.state.read().unwrap().aliases.get(alias).cloned()
    }

    /// Get the number of times `search` was called.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Get the number of times `aggregate_terms` was called.
    pub fn aggregate_calls(&self) -> usize {
        self.aggregate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchIndex for MockSearchIndex {
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), IndexError> {
        let mut state = self.state.write().unwrap();
        if state.indices.contains_key(index) {
            return Err(IndexError::Backend(format!("index {} already exists", index)));
        }
        state.indices.insert(
            index.to_string(),
            StoredIndex {
                mapping: mapping.clone(),
                documents: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn mapping(&self, index: &str) -> Result<Value, IndexError> {
        let state = self.state.read().unwrap();
        let physical = state
            .resolve(index)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", index)))?;
        state
            .indices
            .get(&physical)
            .map(|stored| stored.mapping.clone())
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", physical)))
    }

    async fn index_exists(&self, index: &str) -> Result<bool, IndexError> {
        let state = self.state.read().unwrap();
        Ok(state
            .resolve(index)
            .map(|physical| state.indices.contains_key(&physical))
            .unwrap_or(false))
    }

    async fn delete_index(&self, index: &str) -> Result<(), IndexError> {
        let mut state = self.state.write().unwrap();
        if state.indices.remove(index).is_none() {
            return Err(IndexError::Backend(format!("no such index: {}", index)));
        }
        state.aliases.retain(|_, target| target != index);
        Ok(())
    }

    async fn put_document(&self, index: &str, id: &str, document: &Value) -> Result<(), IndexError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(IndexError::Backend("simulated write failure".to_string()));
        }
        let mut state = self.state.write().unwrap();
        let physical = state
            .resolve(index)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", index)))?;
        state
            .indices
            .get_mut(&physical)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", physical)))?
            .documents
            .insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, IndexError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(IndexError::Backend("simulated write failure".to_string()));
        }
        let mut state = self.state.write().unwrap();
        let Some(physical) = state.resolve(index) else {
            return Ok(false);
        };
        let removed = state
            .indices
            .get_mut(&physical)
            .and_then(|stored| stored.documents.remove(id));
        Ok(removed.is_some())
    }

    async fn search(&self, index: &str, query: &IndexQuery) -> Result<Vec<Value>, IndexError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().unwrap();
        let physical = state
            .resolve(index)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", index)))?;
        let stored = state
            .indices
            .get(&physical)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", physical)))?;

        let mut matches: Vec<Value> = stored
            .documents
            .values()
            .filter(|doc| matches_text(doc, query) && matches_range(doc, query))
            .cloned()
            .collect();

        if let Some(spec) = &query.sort {
            let field = spec.field.strip_suffix(".kw").unwrap_or(&spec.field);
            matches.sort_by(|a, b| compare_field(a, b, field));
            if spec.direction == SortDirection::Desc {
                matches.reverse();
            }
        }

        matches.truncate(query.size);
        Ok(matches)
    }

    async fn aggregate_terms(
        &self,
        index: &str,
        aggregation: &TermsAggregation,
    ) -> Result<Vec<TermsBucket>, IndexError> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().unwrap();
        let physical = state
            .resolve(index)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", index)))?;
        let stored = state
            .indices
            .get(&physical)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", physical)))?;

        let mut groups: BTreeMap<String, (f64, Option<Value>)> = BTreeMap::new();
        for doc in stored.documents.values() {
            let Some(key) = doc.get(&aggregation.field).and_then(Value::as_str) else {
                continue;
            };
            let amount = doc
                .get(&aggregation.sum_field)
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let entry = groups.entry(key.to_string()).or_insert((0.0, None));
            entry.0 += amount;
            if entry.1.is_none() {
                entry.1 = Some(project_source(doc, &aggregation.top_hit_source));
            }
        }

        let mut buckets: Vec<TermsBucket> = groups
            .into_iter()
            .map(|(key, (total, top_hit))| TermsBucket {
                key,
                total,
                top_hit,
            })
            .collect();
        buckets.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
        buckets.truncate(aggregation.size);
        Ok(buckets)
    }

    async fn aliased_indices(&self, alias: &str) -> Result<Option<Vec<String>>, IndexError> {
        let state = self.state.read().unwrap();
        Ok(state.aliases.get(alias).map(|index| vec![index.clone()]))
    }

    async fn put_alias(&self, index: &str, alias: &str) -> Result<(), IndexError> {
        let mut state = self.state.write().unwrap();
        if !state.indices.contains_key(index) {
            return Err(IndexError::Backend(format!("no such index: {}", index)));
        }
        state.aliases.insert(alias.to_string(), index.to_string());
        Ok(())
    }

    async fn delete_alias(&self, index: &str, alias: &str) -> Result<(), IndexError> {
        let mut state = self.state.write().unwrap();
        if state.aliases.get(alias).map(String::as_str) == Some(index) {
            state.aliases.remove(alias);
        }
        Ok(())
    }

    async fn reindex(&self, source: &str, dest: &str) -> Result<(), IndexError> {
        let mut state = self.state.write().unwrap();
        let source_physical = state
            .resolve(source)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", source)))?;
        let dest_physical = state
            .resolve(dest)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", dest)))?;

        let documents: Vec<(String, Value)> = state
            .indices
            .get(&source_physical)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", source_physical)))?
            .documents
            .iter()
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();

        let target = state
            .indices
            .get_mut(&dest_physical)
            .ok_or_else(|| IndexError::Backend(format!("no such index: {}", dest_physical)))?;
        for (id, doc) in documents {
            target.documents.insert(id, doc);
        }
        Ok(())
    }
}

fn matches_text(doc: &Value, query: &IndexQuery) -> bool {
    let Some(text) = &query.text else {
        return true;
    };
    let needle = text.query.to_lowercase();
    text.fields.iter().any(|field| {
        doc.get(field)
            .and_then(Value::as_str)
            .map(|value| value.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

fn matches_range(doc: &Value, query: &IndexQuery) -> bool {
    let Some(range) = &query.range else {
        return true;
    };
    let Some(value) = doc.get(&range.field).and_then(Value::as_f64) else {
        return false;
    };
    if let Some(gte) = range.gte {
        if value < gte {
            return false;
        }
    }
    if let Some(lte) = range.lte {
        if value > lte {
            return false;
        }
    }
    true
}

fn compare_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    let left = a.get(field);
    let right = b.get(field);
    match (
        left.and_then(Value::as_f64),
        right.and_then(Value::as_f64),
    ) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(std::cmp::Ordering::Equal),
        _ => {
            let l = left.and_then(Value::as_str).unwrap_or_default();
            let r = right.and_then(Value::as_str).unwrap_or_default();
            l.cmp(r)
        }
    }
}

fn project_source(doc: &Value, fields: &[String]) -> Value {
    let mut source = Map::new();
    for field in fields {
        if let Some(value) = doc.get(field) {
            source.insert(field.clone(), value.clone());
        }
    }
    Value::Object(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::types::{RangeFilter, SortSpec, TextMatch};
    use serde_json::json;

    fn product(id: &str, name: &str, price: f64) -> Value {
        json!({"id": id, "name": name, "description": "", "price": price})
    }

    fn query(text: Option<&str>, sort: Option<SortSpec>) -> IndexQuery {
        IndexQuery {
            text: text.map(|q| TextMatch {
                query: q.to_string(),
                fields: vec!["name".to_string(), "description".to_string()],
            }),
            range: None,
            sort,
            size: 20,
        }
    }

    #[tokio::test]
    async fn documents_resolve_through_aliases() {
        let index = MockSearchIndex::new()
            .with_index("products-v1", json!({}))
            .with_alias("products", "products-v1");

        index
            .put_document("products", "p-1", &product("p-1", "Keyboard", 10.0))
            .await
            .unwrap();

        assert!(index.document("products-v1", "p-1").is_some());
        assert_eq!(index.document_count("products"), 1);
    }

    #[tokio::test]
    async fn delete_document_reports_absence() {
        let index = MockSearchIndex::new().with_index("products", json!({}));

        index
            .put_document("products", "p-1", &product("p-1", "Keyboard", 10.0))
            .await
            .unwrap();

        assert!(index.delete_document("products", "p-1").await.unwrap());
        assert!(!index.delete_document("products", "p-1").await.unwrap());
    }

    #[tokio::test]
    async fn search_filters_by_text_and_range() {
        let index = MockSearchIndex::new()
            .with_index("products", json!({}))
            .with_document("products", "p-1", product("p-1", "Keyboard", 10.0))
            .with_document("products", "p-2", product("p-2", "Keyboard Pro", 90.0))
            .with_document("products", "p-3", product("p-3", "Mouse", 15.0));

        let mut q = query(Some("keyboard"), None);
        q.range = Some(RangeFilter {
            field: "price".to_string(),
            gte: None,
            lte: Some(50.0),
        });

        let results = index.search("products", &q).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "p-1");
    }

    #[tokio::test]
    async fn search_sorts_with_kw_suffix_and_direction() {
        let index = MockSearchIndex::new()
            .with_index("products", json!({}))
            .with_document("products", "p-1", product("p-1", "Banana", 30.0))
            .with_document("products", "p-2", product("p-2", "Apple", 10.0))
            .with_document("products", "p-3", product("p-3", "Cherry", 20.0));

        let by_name = query(
            None,
            Some(SortSpec {
                field: "name.kw".to_string(),
                direction: SortDirection::Asc,
            }),
        );
        let results = index.search("products", &by_name).await.unwrap();
        let names: Vec<&str> = results.iter().map(|d| d["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Apple", "Banana", "Cherry"]);

        let by_price_desc = query(
            None,
            Some(SortSpec {
                field: "price".to_string(),
                direction: SortDirection::Desc,
            }),
        );
        let results = index.search("products", &by_price_desc).await.unwrap();
        let prices: Vec<f64> = results.iter().map(|d| d["price"].as_f64().unwrap()).collect();
        assert_eq!(prices, vec![30.0, 20.0, 10.0]);
    }

    #[tokio::test]
    async fn aggregate_groups_sums_and_orders() {
        let index = MockSearchIndex::new()
            .with_index("orders", json!({}))
            .with_document(
                "orders",
                "o-1",
                json!({"productId": "p-1", "productName": "Keyboard", "quantity": 2}),
            )
            .with_document(
                "orders",
                "o-2",
                json!({"productId": "p-2", "productName": "Mouse", "quantity": 5}),
            )
            .with_document(
                "orders",
                "o-3",
                json!({"productId": "p-1", "productName": "Keyboard", "quantity": 1}),
            );

        let buckets = index
            .aggregate_terms(
                "orders",
                &TermsAggregation {
                    field: "productId".to_string(),
                    size: 10,
                    sum_field: "quantity".to_string(),
                    top_hit_source: vec!["productName".to_string()],
                },
            )
            .await
            .unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, "p-2");
        assert_eq!(buckets[0].total, 5.0);
        assert_eq!(buckets[1].key, "p-1");
        assert_eq!(buckets[1].total, 3.0);
        assert_eq!(
            buckets[1].top_hit.as_ref().unwrap()["productName"],
            "Keyboard"
        );
    }

    #[tokio::test]
    async fn reindex_copies_documents() {
        let index = MockSearchIndex::new()
            .with_index("products-v1", json!({}))
            .with_index("products-v2", json!({}))
            .with_document("products-v1", "p-1", product("p-1", "Keyboard", 10.0));

        index.reindex("products-v1", "products-v2").await.unwrap();

        assert!(index.document("products-v2", "p-1").is_some());
        assert!(index.document("products-v1", "p-1").is_some());
    }

    #[tokio::test]
    async fn aliased_indices_reflects_alias_map_only() {
        let index = MockSearchIndex::new().with_index("products", json!({}));

        assert_eq!(index.aliased_indices("products").await.unwrap(), None);

        index.put_alias("products", "current").await.unwrap();
        assert_eq!(
            index.aliased_indices("current").await.unwrap(),
            Some(vec!["products".to_string()])
        );
    }

    #[tokio::test]
    async fn delete_index_drops_its_aliases() {
        let index = MockSearchIndex::new()
            .with_index("products-v1", json!({}))
            .with_alias("products", "products-v1");

        index.delete_index("products-v1").await.unwrap();

        assert_eq!(index.alias_target("products"), None);
        assert!(!index.index_exists("products").await.unwrap());
    }
}

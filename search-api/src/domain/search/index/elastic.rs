//! Search index adapter over the Elasticsearch client.
//!
//! Translates the backend-neutral query model into the Elasticsearch DSL and
//! parses aggregation trees back into typed buckets.

use async_trait::async_trait;
use es_client::{ElasticClient, ElasticError};
use serde_json::{json, Map, Value};

use crate::domain::search::traits::{IndexError, Result, SearchIndex};
use crate::domain::search::types::{IndexQuery, SortDirection, TermsAggregation, TermsBucket};

/// Elasticsearch-backed implementation of the index port.
pub struct ElasticIndex {
    client: ElasticClient,
}

impl ElasticIndex {
    pub fn new(client: ElasticClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), IndexError> {
        // Indices here are small and single-writer; one shard, no replicas.
        let body = json!({
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 0,
            },
            "mappings": mapping,
        });
        self.client
            .create_index(index, &body)
            .await
            .map_err(map_err)
    }

    async fn mapping(&self, index: &str) -> Result<Value, IndexError> {
        self.client.get_mapping(index).await.map_err(map_err)
    }

    async fn index_exists(&self, index: &str) -> Result<bool, IndexError> {
        self.client.index_exists(index).await.map_err(map_err)
    }

    async fn delete_index(&self, index: &str) -> Result<(), IndexError> {
        self.client.delete_index(index).await.map_err(map_err)
    }

    async fn put_document(&self, index: &str, id: &str, document: &Value) -> Result<(), IndexError> {
        self.client
            .put_document(index, id, document)
            .await
            .map_err(map_err)
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<bool, IndexError> {
        self.client.delete_document(index, id).await.map_err(map_err)
    }

    async fn search(&self, index: &str, query: &IndexQuery) -> Result<Vec<Value>, IndexError> {
        let body = query_body(query);
        let response = self.client.search(index, &body).await.map_err(map_err)?;
        Ok(response.into_sources())
    }

    async fn aggregate_terms(
        &self,
        index: &str,
        aggregation: &TermsAggregation,
    ) -> Result<Vec<TermsBucket>, IndexError> {
        let body = aggregation_body(aggregation);
        let response = self.client.search(index, &body).await.map_err(map_err)?;
        parse_buckets(response.aggregations)
    }

    async fn aliased_indices(&self, alias: &str) -> Result<Option<Vec<String>>, IndexError> {
        self.client.aliased_indices(alias).await.map_err(map_err)
    }

    async fn put_alias(&self, index: &str, alias: &str) -> Result<(), IndexError> {
        self.client.put_alias(index, alias).await.map_err(map_err)
    }

    async fn delete_alias(&self, index: &str, alias: &str) -> Result<(), IndexError> {
        self.client.delete_alias(index, alias).await.map_err(map_err)
    }

    async fn reindex(&self, source: &str, dest: &str) -> Result<(), IndexError> {
        self.client.reindex(source, dest).await.map_err(map_err)
    }
}

fn map_err(e: ElasticError) -> IndexError {
    match e {
        ElasticError::ParsingError(msg) => IndexError::InvalidResponse(msg),
        other => IndexError::Backend(other.to_string()),
    }
}

fn query_body(query: &IndexQuery) -> Value {
    let mut must = Vec::new();
    if let Some(text) = &query.text {
        must.push(json!({
            "multi_match": {
                "query": text.query,
                "fields": text.fields,
            }
        }));
    }

    let mut filter = Vec::new();
    if let Some(range) = &query.range {
        let mut bounds = Map::new();
        if let Some(gte) = range.gte {
            bounds.insert("gte".to_string(), json!(gte));
        }
        if let Some(lte) = range.lte {
            bounds.insert("lte".to_string(), json!(lte));
        }
        let mut by_field = Map::new();
        by_field.insert(range.field.clone(), Value::Object(bounds));
        filter.push(json!({ "range": Value::Object(by_field) }));
    }

    let mut body = json!({
        "size": query.size,
        "query": {
            "bool": {
                "must": must,
                "filter": filter,
            }
        }
    });

    if let Some(spec) = &query.sort {
        let order = match spec.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        let mut by_field = Map::new();
        by_field.insert(spec.field.clone(), json!({ "order": order }));
        body["sort"] = json!([Value::Object(by_field)]);
    }

    body
}

fn aggregation_body(aggregation: &TermsAggregation) -> Value {
    json!({
        "size": 0,
        "aggs": {
            "groups": {
                "terms": {
                    "field": aggregation.field,
                    "size": aggregation.size,
                    "order": { "total": "desc" },
                },
                "aggs": {
                    "total": { "sum": { "field": aggregation.sum_field } },
                    "top": {
                        "top_hits": {
                            "size": 1,
                            "_source": { "includes": aggregation.top_hit_source },
                        }
                    }
                }
            }
        }
    })
}

fn parse_buckets(aggregations: Option<Value>) -> Result<Vec<TermsBucket>, IndexError> {
    let Some(aggregations) = aggregations else {
        return Ok(Vec::new());
    };

    let buckets = aggregations
        .pointer("/groups/buckets")
        .and_then(Value::as_array)
        .ok_or_else(|| IndexError::InvalidResponse("missing terms buckets".to_string()))?;

    buckets
        .iter()
        .map(|bucket| {
            let key = bucket
                .get("key")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    IndexError::InvalidResponse("terms bucket without string key".to_string())
                })?
                .to_string();
            let total = bucket
                .pointer("/total/value")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let top_hit = bucket.pointer("/top/hits/hits/0/_source").cloned();

            Ok(TermsBucket {
                key,
                total,
                top_hit,
            })
        })
        .collect()
}

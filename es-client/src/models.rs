use serde::Deserialize;
use serde_json::Value;

/// The subset of an Elasticsearch `_search` response consumers need: hit
/// sources plus the raw aggregations tree when the query asked for any.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: SearchHits,
    #[serde(default)]
    pub aggregations: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHits {
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_source")]
    pub source: Value,
}

impl SearchResponse {
    /// Consumes the response and returns the hit sources in rank order.
    pub fn into_sources(self) -> Vec<Value> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }
}

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{models::SearchResponse, ElasticURL};

/// Thin client for the Elasticsearch REST API. Bodies are plain JSON values;
/// callers own the query DSL and mapping shapes.
pub struct ElasticClient {
    http: reqwest::Client,
    base_url: ElasticURL,
}

impl ElasticClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: ElasticURL::new(base_url),
        }
    }

    /// `PUT /{index}` with settings and mappings.
    pub async fn create_index(&self, index: &str, body: &Value) -> Result<(), ElasticError> {
        let url = self.base_url.append_path(index);
        let resp = self
            .http
            .put(url.as_ref())
            .json(body)
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        Self::expect_success(resp).await?;
        debug!(index, "created index");
        Ok(())
    }

    /// `GET /{index}/_mapping`, unwrapped to the single index's `mappings`
    /// object. `index` may be an alias; the response is keyed by the physical
    /// index name, so the first (only) entry is taken.
    pub async fn get_mapping(&self, index: &str) -> Result<Value, ElasticError> {
        let url = self.base_url.append_path(&format!("{}/_mapping", index));
        let resp = self
            .http
            .get(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }

        let raw: Value = Self::read_json(resp).await?;
        raw.as_object()
            .and_then(|indices| indices.values().next())
            .and_then(|entry| entry.get("mappings"))
            .cloned()
            .ok_or_else(|| {
                ElasticError::ParsingError(format!("no mappings entry in response for {}", index))
            })
    }

    /// `HEAD /{index}`; also matches aliases.
    pub async fn index_exists(&self, index: &str) -> Result<bool, ElasticError> {
        let url = self.base_url.append_path(index);
        let resp = self
            .http
            .head(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        match resp.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::status_error(resp).await),
        }
    }

    /// `DELETE /{index}`.
    pub async fn delete_index(&self, index: &str) -> Result<(), ElasticError> {
        let url = self.base_url.append_path(index);
        let resp = self
            .http
            .delete(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        Self::expect_success(resp).await
    }

    /// `PUT /{index}/_doc/{id}`, a full upsert of the document source.
    pub async fn put_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<(), ElasticError> {
        let url = self.base_url.append_path(&format!("{}/_doc/{}", index, id));
        let resp = self
            .http
            .put(url.as_ref())
            .json(document)
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        Self::expect_success(resp).await
    }

    /// `DELETE /{index}/_doc/{id}`. Returns whether the document existed;
    /// a 404 is a regular outcome, not an error.
    pub async fn delete_document(&self, index: &str, id: &str) -> Result<bool, ElasticError> {
        let url = self.base_url.append_path(&format!("{}/_doc/{}", index, id));
        let resp = self
            .http
            .delete(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        match resp.status().as_u16() {
            404 => Ok(false),
            code if (200..300).contains(&code) => Ok(true),
            _ => Err(Self::status_error(resp).await),
        }
    }

    /// `POST /{index}/_search` with a query DSL body.
    pub async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, ElasticError> {
        let url = self.base_url.append_path(&format!("{}/_search", index));
        let resp = self
            .http
            .post(url.as_ref())
            .json(body)
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }
        Self::read_json(resp).await
    }

    /// `GET /_alias/{alias}`, resolving to the physical indices behind an
    /// alias, or `None` when the alias does not exist.
    pub async fn aliased_indices(&self, alias: &str) -> Result<Option<Vec<String>>, ElasticError> {
        let url = self.base_url.append_path(&format!("_alias/{}", alias));
        let resp = self
            .http
            .get(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::status_error(resp).await);
        }

        let raw: Value = Self::read_json(resp).await?;
        let indices = raw
            .as_object()
            .map(|entries| entries.keys().cloned().collect())
            .ok_or_else(|| {
                ElasticError::ParsingError(format!("unexpected alias response for {}", alias))
            })?;
        Ok(Some(indices))
    }

    /// `PUT /{index}/_alias/{alias}`.
    pub async fn put_alias(&self, index: &str, alias: &str) -> Result<(), ElasticError> {
        let url = self
            .base_url
            .append_path(&format!("{}/_alias/{}", index, alias));
        let resp = self
            .http
            .put(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        Self::expect_success(resp).await
    }

    /// `DELETE /{index}/_alias/{alias}`. A missing alias is tolerated.
    pub async fn delete_alias(&self, index: &str, alias: &str) -> Result<(), ElasticError> {
        let url = self
            .base_url
            .append_path(&format!("{}/_alias/{}", index, alias));
        let resp = self
            .http
            .delete(url.as_ref())
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Ok(());
        }
        Self::expect_success(resp).await
    }

    /// `POST /_reindex?wait_for_completion=true`, blocking until the copy
    /// from `source` into `dest` finishes.
    pub async fn reindex(&self, source: &str, dest: &str) -> Result<(), ElasticError> {
        let url = self
            .base_url
            .append_path("_reindex")
            .with_param("wait_for_completion", "true");
        let body = serde_json::json!({
            "source": {"index": source},
            "dest": {"index": dest},
        });
        let resp = self
            .http
            .post(url.as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|e| ElasticError::ResponseError(e.to_string()))?;

        Self::expect_success(resp).await?;
        debug!(source, dest, "reindex completed");
        Ok(())
    }

    async fn expect_success(resp: reqwest::Response) -> Result<(), ElasticError> {
        if resp.status().is_success() {
            return Ok(());
        }
        Err(Self::status_error(resp).await)
    }

    async fn status_error(resp: reqwest::Response) -> ElasticError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        ElasticError::UnexpectedStatus(status, body)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ElasticError> {
        resp.json::<T>().await.map_err(|e| {
            ElasticError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }
}

#[derive(Error, Debug)]
pub enum ElasticError {
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("UnexpectedStatus {0}: {1}")]
    UnexpectedStatus(u16, String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
}

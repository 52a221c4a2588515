use std::time::Duration;

use tracing::debug;

use crate::{
    client::{status_error, KAFKA_JSON_V2, KAFKA_V2},
    models::ConsumerRecord,
    KafkaRestError,
};

/// A consumer instance created through [`crate::KafkaRestClient::create_consumer`].
///
/// All requests go to the instance's `base_uri` as returned by the proxy,
/// which already encodes the group and instance id.
pub struct ConsumerInstance {
    http: reqwest::Client,
    base_uri: String,
}

impl ConsumerInstance {
    pub(crate) fn new(http: reqwest::Client, base_uri: String) -> Self {
        Self { http, base_uri }
    }

    /// Subscribes the instance to the given topics. Replaces any previous
    /// subscription.
    pub async fn subscribe(&self, topics: &[String]) -> Result<(), KafkaRestError> {
        let url = format!("{}/subscription", self.base_uri);
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, KAFKA_V2)
            .json(&serde_json::json!({ "topics": topics }))
            .send()
            .await
            .map_err(|e| KafkaRestError::ResponseError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        debug!(?topics, "subscribed consumer instance");

        Ok(())
    }

    /// Fetches the records accumulated since the last poll, waiting at most
    /// `timeout` for new ones to arrive.
    pub async fn poll(&self, timeout: Duration) -> Result<Vec<ConsumerRecord>, KafkaRestError> {
        let url = format!("{}/records?timeout={}", self.base_uri, timeout.as_millis());
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, KAFKA_JSON_V2)
            .send()
            .await
            .map_err(|e| KafkaRestError::ResponseError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        resp.json::<Vec<ConsumerRecord>>().await.map_err(|e| {
            KafkaRestError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })
    }

    /// Destroys the instance on the proxy, releasing its partitions.
    pub async fn delete(self) -> Result<(), KafkaRestError> {
        let resp = self
            .http
            .delete(&self.base_uri)
            .header(reqwest::header::CONTENT_TYPE, KAFKA_V2)
            .send()
            .await
            .map_err(|e| KafkaRestError::ResponseError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        debug!("deleted consumer instance");

        Ok(())
    }
}

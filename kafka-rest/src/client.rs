use thiserror::Error;
use tracing::debug;

use crate::{
    models::{CreateConsumerRequest, CreateConsumerResponse, ProxyErrorBody},
    ConsumerInstance, ProxyURL,
};

/// Media type for consumer-lifecycle requests against the REST proxy v2 API.
pub(crate) const KAFKA_V2: &str = "application/vnd.kafka.v2+json";
/// Media type for reading records published in the JSON embedded format.
pub(crate) const KAFKA_JSON_V2: &str = "application/vnd.kafka.json.v2+json";

/// Client for the Kafka REST Proxy v2 consumer API.
pub struct KafkaRestClient {
    http: reqwest::Client,
    base_url: ProxyURL,
}

impl KafkaRestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: ProxyURL::new(base_url),
        }
    }

    /// Creates a consumer instance in `group` reading JSON records from the
    /// earliest uncommitted offset, with offset auto-commit enabled. When
    /// `name` is `None` the proxy assigns an instance id.
    pub async fn create_consumer(
        &self,
        group: &str,
        name: Option<&str>,
    ) -> Result<ConsumerInstance, KafkaRestError> {
        let url = self.base_url.append_path(&format!("consumers/{}", group));
        let request = CreateConsumerRequest {
            name,
            format: "json",
            auto_offset_reset: "earliest",
            auto_commit_enable: "true",
        };

        let resp = self
            .http
            .post(url.as_ref())
            .header(reqwest::header::CONTENT_TYPE, KAFKA_V2)
            .json(&request)
            .send()
            .await
            .map_err(|e| KafkaRestError::ResponseError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let created = resp.json::<CreateConsumerResponse>().await.map_err(|e| {
            KafkaRestError::ParsingError(format!("Failed to parse response as JSON: {}", e))
        })?;
        debug!(group, instance = %created.instance_id, "created consumer instance");

        Ok(ConsumerInstance::new(self.http.clone(), created.base_uri))
    }
}

pub(crate) async fn status_error(resp: reqwest::Response) -> KafkaRestError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProxyErrorBody>(&body)
        .map(|e| format!("{} ({})", e.message, e.error_code))
        .unwrap_or(body);
    KafkaRestError::UnexpectedStatus(status, message)
}

#[derive(Error, Debug)]
pub enum KafkaRestError {
    #[error("ResponseError: {0}")]
    ResponseError(String),
    #[error("UnexpectedStatus {0}: {1}")]
    UnexpectedStatus(u16, String),
    #[error("ParsingError: {0}")]
    ParsingError(String),
}

use std::time::Duration;

use async_trait::async_trait;
use kafka_rest::{ConsumerRecord, KafkaRestClient, KafkaRestError};
use tracing::{debug, info};

use crate::domain::search::traits::{ConsumerError, EventConsumer, Result};
use crate::domain::search::types::BusRecord;

/// [`EventConsumer`] backed by a Kafka REST proxy consumer instance.
///
/// The instance is created lazily on the first poll and recreated after a
/// failed poll, since the proxy garbage-collects idle instances and a stored
/// `base_uri` can go stale at any time.
pub struct KafkaRestSource {
    client: KafkaRestClient,
    group: String,
    topics: Vec<String>,
    instance: Option<kafka_rest::ConsumerInstance>,
}

impl KafkaRestSource {
    pub fn new(
        proxy_url: impl Into<String>,
        group: impl Into<String>,
        topics: Vec<String>,
    ) -> Self {
        Self {
            client: KafkaRestClient::new(proxy_url),
            group: group.into(),
            topics,
            instance: None,
        }
    }

    async fn connect(&mut self) -> Result<(), ConsumerError> {
        let instance = self
            .client
            .create_consumer(&self.group, None)
            .await
            .map_err(map_err)?;
        instance.subscribe(&self.topics).await.map_err(map_err)?;
        info!(
            group = %self.group,
            topics = ?self.topics,
            "joined consumer group through the rest proxy"
        );
        self.instance = Some(instance);
        Ok(())
    }
}

#[async_trait]
impl EventConsumer for KafkaRestSource {
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<BusRecord>, ConsumerError> {
        if self.instance.is_none() {
            self.connect().await?;
        }
        let Some(instance) = self.instance.as_ref() else {
            return Err(ConsumerError::Backend(
                "consumer instance unavailable".to_string(),
            ));
        };

        match instance.poll(timeout).await {
            Ok(records) => Ok(records.into_iter().map(to_bus_record).collect()),
            Err(e) => {
                // Drop the instance so the next poll starts from a fresh one.
                self.instance = None;
                Err(map_err(e))
            }
        }
    }

    async fn close(&mut self) -> Result<(), ConsumerError> {
        if let Some(instance) = self.instance.take() {
            instance.delete().await.map_err(map_err)?;
            debug!(group = %self.group, "deleted consumer instance");
        }
        Ok(())
    }
}

fn to_bus_record(record: ConsumerRecord) -> BusRecord {
    BusRecord {
        topic: record.topic,
        value: record.value,
    }
}

fn map_err(e: KafkaRestError) -> ConsumerError {
    ConsumerError::Backend(e.to_string())
}

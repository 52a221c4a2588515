//! Background loop that keeps the search index in step with the event bus.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use super::events::{DomainEvent, EventEnvelope};
use super::repository::SearchRepository;
use super::traits::EventConsumer;
use super::types::{BusRecord, ProductDocument};

/// Topics the synchronizer subscribes to.
pub const TOPICS: [&str; 2] = ["product", "order"];

/// Configuration for the event synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a single poll waits for records
    pub poll_timeout: Duration,
    /// Pause after a failed poll before trying again
    pub error_backoff: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(1),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// Polls the bus until shutdown is signalled, applying every decodable event
/// to the repository.
///
/// Records that cannot be decoded are logged and dropped, as are events whose
/// index write fails; consumption is at-least-once and the loop never retries
/// a record. On exit the consumer's bus resources are released.
#[instrument(name = "synchronizer", skip_all)]
pub async fn run_synchronizer(
    repository: Arc<SearchRepository>,
    mut consumer: Box<dyn EventConsumer>,
    config: SyncConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(topics = ?TOPICS, "Event synchronizer started");

    loop {
        let batch = tokio::select! {
            _ = shutdown.changed() => break,
            batch = consumer.poll(config.poll_timeout) => batch,
        };

        match batch {
            Ok(records) => {
                for record in records {
                    apply(&repository, record).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Polling the bus failed, backing off");
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(config.error_backoff) => {}
                }
            }
        }
    }

    if let Err(e) = consumer.close().await {
        warn!(error = %e, "Failed to release the bus consumer");
    }
    info!("Event synchronizer stopped");
}

async fn apply(repository: &SearchRepository, record: BusRecord) {
    let Some(envelope) = EventEnvelope::decode(&record.value) else {
        debug!(topic = %record.topic, "Dropping record without an event envelope");
        return;
    };

    let event = match DomainEvent::decode(&record.topic, &envelope) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(topic = %record.topic, title = %envelope.title, "Ignoring unhandled event");
            return;
        }
        Err(e) => {
            warn!(
                topic = %record.topic,
                title = %envelope.title,
                error = %e,
                "Skipping undecodable event"
            );
            return;
        }
    };

    let outcome = match &event {
        DomainEvent::ProductUpserted(product) => repository.index(product).await,
        DomainEvent::ProductDeleted { id } => repository
            .delete::<ProductDocument>(id)
            .await
            .map(|_removed| ()),
        DomainEvent::OrderCreated(order) => repository.index(order).await,
    };
    if let Err(e) = outcome {
        error!(
            topic = %record.topic,
            title = %envelope.title,
            error = %e,
            "Failed to apply event to the index"
        );
    }
}

//! Mock event consumer for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::search::traits::{ConsumerError, EventConsumer, Result};
use crate::domain::search::types::BusRecord;

/// Mock consumer fed from a queue of pre-seeded poll outcomes.
///
/// Each poll pops the next outcome. When the queue is empty the poll waits
/// out its timeout and returns no records, like a long poll against an idle
/// topic would.
#[derive(Clone, Default)]
pub struct MockEventConsumer {
    batches: Arc<Mutex<VecDeque<Result<Vec<BusRecord>, String>>>>,
    closed: Arc<AtomicBool>,
    poll_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockEventConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch of records for a future poll.
    pub fn with_batch(self, records: Vec<BusRecord>) -> Self {
        self.batches.lock().unwrap().push_back(Ok(records));
        self
    }

    /// Queue a failing poll.
    pub fn with_error(self, message: &str) -> Self {
        self.batches
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    /// Whether `close` has been called.
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Get the number of times `poll` was called.
    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    /// Number of queued outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl EventConsumer for MockEventConsumer {
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<BusRecord>, ConsumerError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(ConsumerError::Backend(message)),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Vec::new())
            }
        }
    }

    async fn close(&mut self) -> Result<(), ConsumerError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(topic: &str) -> BusRecord {
        BusRecord {
            topic: topic.to_string(),
            value: json!({"title": "product.created", "payload": {}}),
        }
    }

    #[tokio::test]
    async fn polls_drain_queued_outcomes_in_order() {
        let mut consumer = MockEventConsumer::new()
            .with_batch(vec![record("product")])
            .with_error("proxy unavailable");

        let first = consumer.poll(Duration::from_millis(5)).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].topic, "product");

        let second = consumer.poll(Duration::from_millis(5)).await;
        assert!(second.is_err());

        let third = consumer.poll(Duration::from_millis(5)).await.unwrap();
        assert!(third.is_empty());
        assert_eq!(consumer.poll_calls(), 3);
    }

    #[tokio::test]
    async fn close_marks_the_consumer() {
        let mut consumer = MockEventConsumer::new();
        assert!(!consumer.closed());

        consumer.close().await.unwrap();
        assert!(consumer.closed());
    }
}

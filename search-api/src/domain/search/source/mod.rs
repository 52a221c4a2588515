//! Event bus consumer implementations.

mod kafka;
#[cfg(test)]
mod mock;

pub use kafka::KafkaRestSource;
#[cfg(test)]
pub use mock::MockEventConsumer;

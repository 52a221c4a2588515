//! Decoding of bus records into domain events.

use serde::Deserialize;
use serde_json::Value;

use super::types::{OrderDocument, ProductDocument};

/// The generic wrapper every producer publishes: a dotted event name plus an
/// entity-specific body.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(alias = "Payload")]
    pub payload: Value,
}

impl EventEnvelope {
    /// Decodes a raw record value into an envelope.
    ///
    /// Some producers publish the envelope as a JSON string rather than an
    /// object; both forms are accepted. Returns `None` for anything that is
    /// not an envelope, which callers drop without failing the loop.
    pub fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => serde_json::from_str(raw).ok(),
            other => serde_json::from_value(other.clone()).ok(),
        }
    }
}

/// A mutation this service reacts to, decoded from an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    ProductUpserted(ProductDocument),
    ProductDeleted { id: String },
    OrderCreated(OrderDocument),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("{0}")]
    Payload(#[from] serde_json::Error),

    #[error("payload is missing a usable id")]
    MissingId,
}

/// Deletion events carry the full upstream entity; only the id matters here.
#[derive(Deserialize)]
struct DeletedEntity {
    #[serde(alias = "Id")]
    id: String,
}

impl DomainEvent {
    /// Maps an envelope received on `topic` to a domain event.
    ///
    /// `Ok(None)` means the title is not one this service consumes (including
    /// titles arriving on the wrong topic); `Err` means the title was
    /// recognized but its payload did not decode.
    pub fn decode(topic: &str, envelope: &EventEnvelope) -> Result<Option<Self>, DecodeError> {
        match (topic, envelope.title.as_str()) {
            ("product", "product.created") | ("product", "product.updated") => {
                let doc: ProductDocument = serde_json::from_value(envelope.payload.clone())?;
                Ok(Some(DomainEvent::ProductUpserted(doc)))
            }
            ("product", "product.deleted") => {
                let entity: DeletedEntity = serde_json::from_value(envelope.payload.clone())?;
                if entity.id.trim().is_empty() {
                    return Err(DecodeError::MissingId);
                }
                Ok(Some(DomainEvent::ProductDeleted { id: entity.id }))
            }
            ("order", "order.created") => {
                let doc: OrderDocument = serde_json::from_value(envelope.payload.clone())?;
                Ok(Some(DomainEvent::OrderCreated(doc)))
            }
            _ => Ok(None),
        }
    }
}

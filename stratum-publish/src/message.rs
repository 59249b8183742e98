//! Publish event payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logical record-change event, ready for fan-out.
///
/// Immutable per publish call: built once by the caller, read by every
/// backend send. Carries the payload batch, the destination name each
/// backend should use, and the event metadata stamped onto the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishInfo {
    /// Unique event id
    pub id: String,

    /// Event subject (what the event is about)
    pub subject: String,

    /// Event type identifier (e.g. `recordChanged`)
    pub event_type: String,

    /// Schema version of the payload
    pub data_version: String,

    /// Payload batch
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,

    /// Destination topic on the message-bus backend
    #[serde(default)]
    pub bus_topic: String,

    /// Destination topic on the event-grid backend
    #[serde(default)]
    pub grid_topic: String,

    /// Correlation id carried from the originating request
    pub correlation_id: Option<String>,

    /// Timestamp the event was assembled
    pub created_at: DateTime<Utc>,
}

impl PublishInfo {
    /// Create an event with a generated id and an empty batch
    pub fn new(
        subject: impl Into<String>,
        event_type: impl Into<String>,
        data_version: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject: subject.into(),
            event_type: event_type.into(),
            data_version: data_version.into(),
            messages: Vec::new(),
            bus_topic: String::new(),
            grid_topic: String::new(),
            correlation_id: None,
            created_at: Utc::now(),
        }
    }

    /// Append one payload message
    pub fn with_message(mut self, message: serde_json::Value) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the payload batch
    pub fn with_messages(mut self, messages: Vec<serde_json::Value>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the message-bus destination topic
    pub fn with_bus_topic(mut self, topic: impl Into<String>) -> Self {
        self.bus_topic = topic.into();
        self
    }

    /// Set the event-grid destination topic
    pub fn with_grid_topic(mut self, topic: impl Into<String>) -> Self {
        self.grid_topic = topic.into();
        self
    }

    /// Set the correlation id
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Number of payload messages in the batch
    pub fn batch_size(&self) -> usize {
        self.messages.len()
    }
}

//! Change notifications emitted by document stores
//!
//! Every successful write to a store publishes a [`ChangeEvent`] on the store's
//! [`EventBus`]. Live queries (see `rental::subscription`) listen on the bus and
//! re-evaluate their result set when a relevant document changes.
//!
//! # Architecture
//!
//! ```text
//! Ledger::create_rental ──┐
//!                          ├──▶ DocumentStore ──▶ EventBus::publish() ──▶ RentalSubscription
//! Ledger::set_status ─────┘                                           ──▶ WebSocket clients
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Kind of mutation a change event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// A single document mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Collection the document belongs to
    pub collection: String,
    /// Id of the document that changed
    pub document_id: Uuid,
    /// What happened to it
    pub action: ChangeAction,
    /// Document contents after the change (absent for deletions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ChangeEvent {
    pub fn created(collection: &str, document_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            collection: collection.to_string(),
            document_id,
            action: ChangeAction::Created,
            data: Some(data),
        }
    }

    pub fn updated(collection: &str, document_id: Uuid, data: serde_json::Value) -> Self {
        Self {
            collection: collection.to_string(),
            document_id,
            action: ChangeAction::Updated,
            data: Some(data),
        }
    }

    pub fn deleted(collection: &str, document_id: Uuid) -> Self {
        Self {
            collection: collection.to_string(),
            document_id,
            action: ChangeAction::Deleted,
            data: None,
        }
    }

    /// Read a string field from the post-change document, if any
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.as_ref()?.get(field)?.as_str()
    }
}

/// Envelope wrapping a change event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: ChangeEvent,
}

impl EventEnvelope {
    /// Create a new event envelope
    pub fn new(event: ChangeEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Uses `tokio::sync::broadcast`: multiple receivers, each seeing every event
/// published after it subscribed, in publish order.
///
/// The bus is cheap to clone and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. With no subscribers the event is dropped.
    /// Returns the number of receivers that will receive the event.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        // send() only errors when nobody is listening
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

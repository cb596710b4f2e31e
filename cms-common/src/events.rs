//! Store change events
//!
//! Every store mutation publishes a [`CmsEvent`] on the [`EventBus`].
//! Consumers (the SSE stream, tests) subscribe instead of sharing references
//! to store contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::entities::EntityKind;
use crate::EntityId;

/// Console event types
///
/// Serialized with a `type` tag for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CmsEvent {
    /// A whole collection was (re)loaded from the content API
    EntitiesLoaded {
        kind: EntityKind,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// One entity was created or replaced in its store
    EntityUpserted {
        kind: EntityKind,
        id: EntityId,
        timestamp: DateTime<Utc>,
    },

    /// One entity was removed from its store
    EntityDeleted {
        kind: EntityKind,
        id: EntityId,
        timestamp: DateTime<Utc>,
    },

    /// A journey tree was edited in place (sections, units or steps)
    JourneyChanged {
        journey_id: EntityId,
        timestamp: DateTime<Utc>,
    },
}

impl CmsEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            CmsEvent::EntitiesLoaded { .. } => "EntitiesLoaded",
            CmsEvent::EntityUpserted { .. } => "EntityUpserted",
            CmsEvent::EntityDeleted { .. } => "EntityDeleted",
            CmsEvent::JourneyChanged { .. } => "JourneyChanged",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::broadcast`: publishing never blocks, slow subscribers lag
/// and drop old events, receivers clean up when dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CmsEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CmsEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscriber is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: CmsEvent) -> Result<usize, broadcast::error::SendError<CmsEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CmsEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

//! Domain events emitted by the lifecycle managers.
//!
//! Managers publish events through [`crate::traits::EventPublisher`]; the
//! real-time crate turns them into notifications and room broadcasts.

pub mod request;
pub mod session;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

pub use request::RequestEvent;
pub use session::SessionEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event, `None` for timer-driven events.
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A call-request event.
    Request(RequestEvent),
    /// A call-session event.
    Session(SessionEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Shorthand for a request event.
    pub fn request(actor_id: Option<UserId>, event: RequestEvent) -> Self {
        Self::new(actor_id, EventPayload::Request(event))
    }

    /// Shorthand for a session event.
    pub fn session(actor_id: Option<UserId>, event: SessionEvent) -> Self {
        Self::new(actor_id, EventPayload::Session(event))
    }
}

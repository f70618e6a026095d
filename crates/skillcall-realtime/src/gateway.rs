//! Realtime signaling gateway.
//!
//! Publishing is fire-and-forget: each live member of the room gets the
//! event queued on its own bounded buffer, members with a full or closed
//! buffer are skipped, and nothing is retried. Within one room, events are
//! queued in publish order.

use std::sync::Arc;

use tracing::debug;

use crate::connection::ConnectionManager;
use crate::message::types::OutboundMessage;

/// Fans named events out to rooms.
#[derive(Debug, Clone)]
pub struct SignalingGateway {
    connections: Arc<ConnectionManager>,
}

impl SignalingGateway {
    /// Creates a gateway over the connection manager.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Publish `event` with `payload` to every connection in `room`.
    ///
    /// Returns the number of connections the event was queued on.
    pub fn publish(&self, room: &str, event: &str, payload: serde_json::Value) -> usize {
        let message = OutboundMessage::Event {
            room: room.to_string(),
            event: event.to_string(),
            payload,
        };
        let delivered = self.connections.send_to_room(room, &message);
        debug!(room = %room, event = %event, delivered, "Published realtime event");
        delivered
    }
}

//! Inbound and outbound WebSocket message type definitions.

use serde::{Deserialize, Serialize};

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Join a user's personal room.
    JoinUser {
        /// User whose room to join.
        user_id: String,
    },
    /// Join a session's signaling room.
    JoinSession {
        /// Session to follow.
        session_id: String,
    },
    /// Leave a session's signaling room.
    LeaveSession {
        /// Session to stop following.
        session_id: String,
    },
    /// Keepalive.
    Ping,
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// An event published to one of the connection's rooms.
    Event {
        /// Room the event was published to.
        room: String,
        /// Event name, e.g. `request:accepted` or `call-ended`.
        event: String,
        /// Event body.
        payload: serde_json::Value,
    },
    /// Room join confirmed.
    Joined {
        /// Room name.
        room: String,
    },
    /// Room leave confirmed.
    Left {
        /// Room name.
        room: String,
    },
    /// Keepalive reply.
    Pong,
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Build an error frame.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

//! Individual WebSocket connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use skillcall_core::types::id::UserId;

use crate::message::types::OutboundMessage;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the bounded sender feeding the socket's writer task and the close
/// signal the socket tasks watch.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Authenticated user behind the socket
    pub user_id: UserId,
    /// Sender for outbound messages
    sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    closed: watch::Sender<bool>,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, sender: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            sender,
            connected_at: Utc::now(),
            closed: watch::Sender::new(false),
        }
    }

    /// Queue a message for this connection without waiting.
    ///
    /// Returns `false` when the message was dropped.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        !*self.closed.borrow()
    }

    /// Mark connection as closed and wake anything waiting in [`closed`].
    ///
    /// [`closed`]: Self::closed
    pub fn mark_closed(&self) {
        self.closed.send_replace(true);
    }

    /// Resolves once the connection has been marked closed.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

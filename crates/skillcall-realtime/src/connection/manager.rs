//! Connection manager: registration, removal and inbound frame routing.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use skillcall_core::config::realtime::RealtimeConfig;
use skillcall_core::types::id::{SessionId, UserId};

use crate::message::types::{InboundMessage, OutboundMessage};
use crate::room::{RoomRegistry, session_room, user_room};

use super::handle::{ConnectionHandle, ConnectionId};

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection ID → handle.
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    /// Room membership.
    rooms: Arc<RoomRegistry>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, rooms: Arc<RoomRegistry>) -> Self {
        Self {
            connections: DashMap::new(),
            rooms,
            config,
        }
    }

    /// Registers a new authenticated connection and joins it to the user's
    /// personal room.
    ///
    /// Returns the connection handle and a receiver for outbound messages.
    pub fn register(
        &self,
        user_id: UserId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id.clone(), tx));

        let mut existing = self.user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            existing.sort_by_key(|conn| conn.connected_at);
            if let Some(oldest) = existing.first() {
                warn!(
                    user_id = %user_id,
                    max = self.config.max_connections_per_user,
                    replaced = %oldest.id,
                    "User at max connections, oldest will be replaced"
                );
                self.unregister(&oldest.id);
            }
        }

        self.connections.insert(handle.id, handle.clone());
        self.rooms.join(&user_room(&user_id), handle.id);

        info!(conn_id = %handle.id, user_id = %user_id, "WebSocket connection registered");
        (handle, rx)
    }

    /// Unregisters a connection and removes it from all rooms.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some((_, handle)) = self.connections.remove(conn_id) {
            handle.mark_closed();
            self.rooms.leave_all(*conn_id);
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }

    /// Processes an inbound frame from a client. Replies are queued on the
    /// connection itself.
    pub fn handle_inbound(&self, conn_id: &ConnectionId, raw_message: &str) {
        let Some(handle) = self.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        let msg: InboundMessage = match serde_json::from_str(raw_message) {
            Ok(m) => m,
            Err(e) => {
                handle.send(OutboundMessage::error(
                    "INVALID_MESSAGE",
                    format!("Failed to parse message: {e}"),
                ));
                return;
            }
        };

        let reply = match msg {
            InboundMessage::JoinUser { user_id } => {
                self.join(&handle, user_room(&UserId::new(user_id)))
            }
            InboundMessage::JoinSession { session_id } => {
                self.join(&handle, session_room(&SessionId::new(session_id)))
            }
            InboundMessage::LeaveSession { session_id } => {
                let room = session_room(&SessionId::new(session_id));
                self.rooms.leave(&room, handle.id);
                debug!(conn_id = %handle.id, room = %room, "Left room");
                OutboundMessage::Left { room }
            }
            InboundMessage::Ping => OutboundMessage::Pong,
        };
        handle.send(reply);
    }

    fn join(&self, handle: &ConnectionHandle, room: String) -> OutboundMessage {
        self.rooms.join(&room, handle.id);
        debug!(conn_id = %handle.id, room = %room, "Joined room");
        OutboundMessage::Joined { room }
    }

    /// Queue a message on every live member of `room`. Returns how many
    /// connections accepted it.
    pub fn send_to_room(&self, room: &str, message: &OutboundMessage) -> usize {
        let mut delivered = 0;
        for conn_id in self.rooms.members(room) {
            if let Some(handle) = self.get(&conn_id)
                && handle.send(message.clone())
            {
                delivered += 1;
            }
        }
        delivered
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let ids: Vec<ConnectionId> = self.connections.iter().map(|c| *c.key()).collect();
        for id in &ids {
            self.unregister(id);
        }
        info!(count = ids.len(), "All connections closed");
    }

    /// Looks up a connection.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(conn_id).map(|c| c.value().clone())
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Checks if a user is currently connected.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        !self.user_connections(user_id).is_empty()
    }

    fn user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .filter(|c| &c.user_id == user_id)
            .map(|c| c.value().clone())
            .collect()
    }
}

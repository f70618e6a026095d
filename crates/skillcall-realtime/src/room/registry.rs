//! Room registry: which connections sit in which room.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;

/// Registry of all non-empty rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → members.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Connection → rooms it joined (reverse index).
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room. Returns `false` if it was already in.
    pub fn join(&self, room: &str, conn_id: ConnectionId) -> bool {
        let added = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        self.memberships
            .entry(conn_id)
            .or_default()
            .insert(room.to_string());
        added
    }

    /// Removes a connection from a room. Returns `false` if it was not in.
    pub fn leave(&self, room: &str, conn_id: ConnectionId) -> bool {
        let removed = self.drop_member(room, conn_id);
        if let Some(mut rooms) = self.memberships.get_mut(&conn_id) {
            rooms.remove(room);
        }
        removed
    }

    /// Removes a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) {
        if let Some((_, rooms)) = self.memberships.remove(&conn_id) {
            for room in &rooms {
                self.drop_member(room, conn_id);
            }
        }
    }

    /// Current members of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> Vec<String> {
        self.memberships
            .get(&conn_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn drop_member(&self, room: &str, conn_id: ConnectionId) -> bool {
        let removed = match self.rooms.get_mut(room) {
            Some(mut members) => members.remove(&conn_id),
            None => return false,
        };
        self.rooms.remove_if(room, |_, members| members.is_empty());
        removed
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_join_leave_and_cleanup() {
        let registry = RoomRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        assert!(registry.join("session-s1", a));
        assert!(!registry.join("session-s1", a));
        registry.join("session-s1", b);
        registry.join("user-u1", a);
        assert_eq!(registry.members("session-s1").len(), 2);

        assert!(registry.leave("session-s1", b));
        assert!(!registry.leave("session-s1", b));
        assert_eq!(registry.members("session-s1"), vec![a]);

        registry.leave_all(a);
        assert!(registry.members("session-s1").is_empty());
        assert!(registry.rooms_of(a).is_empty());
        assert_eq!(registry.room_count(), 0);
    }
}

//! Logical rooms and their subscribers.

pub mod registry;

pub use registry::RoomRegistry;

use skillcall_core::types::id::{SessionId, UserId};

/// Personal room of a user.
pub fn user_room(user_id: &UserId) -> String {
    format!("user-{user_id}")
}

/// Signaling room of a session.
pub fn session_room(session_id: &SessionId) -> String {
    format!("session-{session_id}")
}

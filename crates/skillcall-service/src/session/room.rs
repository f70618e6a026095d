//! Room access payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use skillcall_core::types::id::SessionId;
use skillcall_entity::session::SessionStatus;

/// A freshly issued credential for the session's media room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomAccess {
    pub token: String,
    pub room_name: String,
    pub ws_url: String,
    /// Seconds left on the call when the token was issued.
    pub remaining_duration: i64,
    pub expires_at: DateTime<Utc>,
}

/// Where and for how long a session's call runs.
#[derive(Debug, Clone, Serialize)]
pub struct RoomInfo {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub room_name: Option<String>,
    pub ws_url: String,
    pub call_duration_minutes: i32,
    pub remaining_seconds: i64,
    pub call_started_at: Option<DateTime<Utc>>,
}

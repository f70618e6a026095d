//! Timing rules for requests, sessions, and notifications, plus the
//! call-room token issuer.

use serde::{Deserialize, Serialize};

/// Lifecycle timing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// Days a pending request stays acceptable.
    #[serde(default = "default_request_ttl_days")]
    pub request_ttl_days: i64,
    /// Duration cap stamped on every new session, in minutes.
    #[serde(default = "default_session_duration")]
    pub session_duration_minutes: i32,
    /// Requested duration recorded on new requests, in minutes.
    #[serde(default = "default_requested_duration")]
    pub requested_duration_minutes: i32,
    /// Days before a notification becomes eligible for purge.
    #[serde(default = "default_notification_ttl_days")]
    pub notification_ttl_days: i64,
    /// Lead time of the "session starting soon" notice, in minutes.
    #[serde(default = "default_starting_lead")]
    pub session_starting_lead_minutes: i64,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            request_ttl_days: default_request_ttl_days(),
            session_duration_minutes: default_session_duration(),
            requested_duration_minutes: default_requested_duration(),
            notification_ttl_days: default_notification_ttl_days(),
            session_starting_lead_minutes: default_starting_lead(),
        }
    }
}

/// LiveKit-compatible room token issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// API key, used as the token issuer.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// API secret used to sign room tokens.
    #[serde(default = "default_api_secret")]
    pub api_secret: String,
    /// WebSocket URL clients connect their media to.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

impl RoomConfig {
    /// Whether the development key or secret is still configured.
    pub fn uses_placeholder_credentials(&self) -> bool {
        self.api_key == default_api_key() || self.api_secret == default_api_secret()
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_secret: default_api_secret(),
            ws_url: default_ws_url(),
        }
    }
}

fn default_request_ttl_days() -> i64 {
    7
}

fn default_session_duration() -> i32 {
    15
}

fn default_requested_duration() -> i32 {
    10
}

fn default_notification_ttl_days() -> i64 {
    30
}

fn default_starting_lead() -> i64 {
    5
}

fn default_api_key() -> String {
    "devkey".to_string()
}

fn default_api_secret() -> String {
    "secret".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:7880".to_string()
}

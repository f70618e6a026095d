//! Room token claim set, in the layout LiveKit servers verify.

use serde::{Deserialize, Serialize};

/// Permissions inside a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Allows joining the named room.
    pub room_join: bool,
    /// The only room the token is valid for.
    pub room: String,
    /// Allows publishing audio/video tracks.
    pub can_publish: bool,
    /// Allows subscribing to other tracks.
    pub can_subscribe: bool,
    /// Allows sending data messages.
    pub can_publish_data: bool,
    /// Allows updating the participant's own metadata.
    pub can_update_own_metadata: bool,
}

impl VideoGrant {
    /// Join-and-talk permissions for one room.
    pub fn participant(room: impl Into<String>) -> Self {
        Self {
            room_join: true,
            room: room.into(),
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
            can_update_own_metadata: true,
        }
    }
}

/// Claims of a room access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomClaims {
    /// API key of the issuer.
    pub iss: String,
    /// Participant identity.
    pub sub: String,
    /// Participant display name.
    pub name: String,
    /// Not valid before (seconds since epoch).
    pub nbf: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// The room grant.
    pub video: VideoGrant,
}

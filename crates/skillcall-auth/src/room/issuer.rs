//! Room token issuing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;

use skillcall_core::config::call::RoomConfig;
use skillcall_core::error::AppError;
use skillcall_core::result::AppResult;
use skillcall_core::types::id::UserId;

use super::grant::{RoomClaims, VideoGrant};

/// What a room token is requested for.
#[derive(Debug, Clone)]
pub struct RoomGrantRequest {
    /// Room to join.
    pub room_name: String,
    /// Participant identity.
    pub identity: UserId,
    /// Display name shown to the other side.
    pub display_name: String,
    /// Seconds left on the call.
    pub remaining_seconds: i64,
}

/// A signed room token and where to use it.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedRoomToken {
    /// Signed credential.
    pub token: String,
    /// Room the token is scoped to.
    pub room_name: String,
    /// Media server endpoint.
    pub ws_url: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Mints scoped credentials for the external call-room service.
pub trait RoomTokenIssuer: Send + Sync + 'static {
    /// Sign a token that can only join `request.room_name`.
    fn issue(&self, request: &RoomGrantRequest) -> AppResult<IssuedRoomToken>;

    /// Endpoint clients connect their media to.
    fn ws_url(&self) -> &str;
}

/// HS256 issuer compatible with LiveKit access tokens.
#[derive(Clone)]
pub struct LiveKitTokenIssuer {
    api_key: String,
    encoding_key: EncodingKey,
    ws_url: String,
}

impl std::fmt::Debug for LiveKitTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveKitTokenIssuer")
            .field("api_key", &self.api_key)
            .field("ws_url", &self.ws_url)
            .finish()
    }
}

impl LiveKitTokenIssuer {
    /// Build an issuer from room configuration.
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            encoding_key: EncodingKey::from_secret(config.api_secret.as_bytes()),
            ws_url: config.ws_url.clone(),
        }
    }
}

impl RoomTokenIssuer for LiveKitTokenIssuer {
    fn issue(&self, request: &RoomGrantRequest) -> AppResult<IssuedRoomToken> {
        // The token must not outlive the call.
        let ttl = request.remaining_seconds;
        if ttl <= 0 {
            return Err(AppError::not_found("Session has no time remaining"));
        }
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl);

        let claims = RoomClaims {
            iss: self.api_key.clone(),
            sub: request.identity.to_string(),
            name: request.display_name.clone(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            video: VideoGrant::participant(&request.room_name),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign room token: {e}")))?;

        tracing::debug!(
            room = %request.room_name,
            identity = %request.identity,
            ttl_seconds = ttl,
            "Issued room token"
        );

        Ok(IssuedRoomToken {
            token,
            room_name: request.room_name.clone(),
            ws_url: self.ws_url.clone(),
            expires_at,
        })
    }

    fn ws_url(&self) -> &str {
        &self.ws_url
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
    use skillcall_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_token_is_scoped_to_room() {
        let config = RoomConfig::default();
        let issuer = LiveKitTokenIssuer::new(&config);
        let issued = issuer
            .issue(&RoomGrantRequest {
                room_name: "session-abc-1".to_string(),
                identity: UserId::from("u1"),
                display_name: "Ada".to_string(),
                remaining_seconds: 600,
            })
            .expect("issue");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.api_key.as_str()]);
        let data = decode::<RoomClaims>(
            &issued.token,
            &DecodingKey::from_secret(config.api_secret.as_bytes()),
            &validation,
        )
        .expect("decode");

        assert_eq!(data.claims.sub, "u1");
        assert_eq!(data.claims.video, VideoGrant::participant("session-abc-1"));
        assert!(data.claims.exp - data.claims.nbf <= 600);
        assert_eq!(issued.ws_url, config.ws_url);
    }

    #[test]
    fn test_token_expires_with_session() {
        let config = RoomConfig::default();
        let before = Utc::now();
        let issued = LiveKitTokenIssuer::new(&config)
            .issue(&RoomGrantRequest {
                room_name: "r".to_string(),
                identity: UserId::from("u1"),
                display_name: "Ada".to_string(),
                remaining_seconds: 5,
            })
            .expect("issue");
        let ttl = (issued.expires_at - before).num_seconds();
        assert!(ttl <= 6, "token ttl {ttl}s outlives the session");
    }

    #[test]
    fn test_no_time_left_is_refused() {
        let err = LiveKitTokenIssuer::new(&RoomConfig::default())
            .issue(&RoomGrantRequest {
                room_name: "r".to_string(),
                identity: UserId::from("u1"),
                display_name: "Ada".to_string(),
                remaining_seconds: 0,
            })
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}

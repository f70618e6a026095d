//! Credentials for the external call-room service.

pub mod grant;
pub mod issuer;

pub use grant::{RoomClaims, VideoGrant};
pub use issuer::{IssuedRoomToken, LiveKitTokenIssuer, RoomGrantRequest, RoomTokenIssuer};

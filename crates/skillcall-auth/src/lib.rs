//! # skillcall-auth
//!
//! Identity and authorization for SkillCall.
//!
//! ## Modules
//!
//! - `jwt`: bearer tokens carrying the verified caller identity
//! - `access`: who may read or act on a request or a session
//! - `room`: scoped credentials for the external call-room service

pub mod access;
pub mod jwt;
pub mod room;

pub use access::{AccessDecision, Guarded, RequestAction, SessionAction, can_act};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use room::{IssuedRoomToken, LiveKitTokenIssuer, RoomGrantRequest, RoomTokenIssuer};

//! # skillcall-realtime
//!
//! Real-time side of SkillCall:
//!
//! - Room registry mapping `user-<id>` and `session-<id>` rooms to live
//!   connections
//! - WebSocket connection management and the signaling wire protocol
//! - The signaling gateway that fans events out to a room
//! - The notification dispatcher (persist, then best-effort push)
//! - An in-process event bus and the bridge from domain events to
//!   notifications and room broadcasts

pub mod bridge;
pub mod connection;
pub mod engine;
pub mod gateway;
pub mod message;
pub mod notification;
pub mod room;

pub use bridge::{EventBridge, EventBus};
pub use connection::{ConnectionHandle, ConnectionId, ConnectionManager};
pub use engine::RealtimeEngine;
pub use gateway::SignalingGateway;
pub use message::{InboundMessage, OutboundMessage};
pub use notification::{NotificationDispatcher, NotificationDraft};
pub use room::{RoomRegistry, session_room, user_room};

//! Session lifecycle: direct invitations, transitions, feedback, and room
//! access.

pub mod room;
pub mod service;
pub mod view;

pub use room::{RoomAccess, RoomInfo};
pub use service::{CreateSessionInput, SessionDraft, SessionLifecycleManager};
pub use view::SessionView;

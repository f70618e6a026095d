//! # skillcall-service
//!
//! Lifecycle managers for call requests and call sessions, plus the
//! notification read side. Managers check access with
//! [`skillcall_auth::can_act`], write through the store traits, and announce
//! every state change as a [`DomainEvent`](skillcall_core::events::DomainEvent)
//! instead of notifying anyone directly.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod notification;
pub mod request;
pub mod session;

pub use context::RequestContext;
pub use notification::{NotificationPage, NotificationService};
pub use request::{
    AcceptedRequest, CreateRequestInput, RequestLifecycleManager, RespondInput,
};
pub use session::{
    CreateSessionInput, RoomAccess, RoomInfo, SessionDraft, SessionLifecycleManager, SessionView,
};

#[cfg(test)]
pub(crate) mod testing;

//! Call session entities.

pub mod model;
pub mod status;

pub use model::{CallSession, NewCallSession, PartySide, SessionOrigin};
pub use status::SessionStatus;

//! Notification creation and live delivery.

pub mod dispatcher;
pub mod templates;

pub use dispatcher::{NotificationDispatcher, NotificationDraft};

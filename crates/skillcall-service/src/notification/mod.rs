//! Notification read side: listing, counts, read state, and cleanup.
//!
//! Creation lives in the real-time crate's dispatcher, which is the only
//! writer of new notifications.

pub mod service;

pub use service::{NotificationPage, NotificationService};

//! Notification entities.

pub mod kind;
pub mod model;

pub use kind::NotificationType;
pub use model::{
    CreateNotification, DeliveryStatus, Notification, NotificationData, NotificationFilter,
};

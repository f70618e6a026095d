//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use skillcall_core::types::Priority;
use skillcall_core::types::id::{NotificationId, RequestId, SessionId, UserId};

use super::kind::NotificationType;

/// A delivery record addressed to one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The user this is for.
    pub recipient_id: UserId,
    /// The user whose action caused it, if any.
    pub sender_id: Option<UserId>,
    /// What happened.
    #[sqlx(rename = "notification_type")]
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Deep-link payload.
    pub data: Json<NotificationData>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// When it was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// Display priority.
    pub priority: Priority,
    /// Per-channel delivery flags.
    pub delivery_status: Json<DeliveryStatus>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// After this instant it may be purged.
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    /// Build a record from its insert form.
    pub fn from_create(input: CreateNotification, now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::generate(),
            recipient_id: input.recipient_id,
            sender_id: input.sender_id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            data: Json(input.data),
            is_read: false,
            read_at: None,
            priority: input.priority,
            delivery_status: Json(DeliveryStatus::default()),
            created_at: now,
            expires_at: input.expires_at,
        }
    }

    /// Check if the notification is past its purge instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Flip the read flag, keeping the first read timestamp.
    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(now);
        }
    }
}

/// Structured deep-link data carried by a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    /// Related call request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_request_id: Option<RequestId>,
    /// Related call session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_session_id: Option<SessionId>,
    /// Related chat message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Related user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Client route to open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Call length in minutes, for call-ready notices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_duration: Option<i32>,
}

/// Which channels have delivered the notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    /// Pushed to at least one live socket.
    pub in_app: bool,
    /// Sent by email.
    pub email: bool,
    /// Sent as a mobile push.
    pub push: bool,
}

/// Insert form of a notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    /// The user this is for.
    pub recipient_id: UserId,
    /// The user whose action caused it.
    pub sender_id: Option<UserId>,
    /// What happened.
    pub kind: NotificationType,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Deep-link payload.
    pub data: NotificationData,
    /// Display priority.
    pub priority: Priority,
    /// Purge instant.
    pub expires_at: DateTime<Utc>,
}

/// Filter for listing one user's notifications.
#[derive(Debug, Clone)]
pub struct NotificationFilter {
    /// Whose notifications.
    pub recipient_id: UserId,
    /// Only this type.
    pub kind: Option<NotificationType>,
    /// Only read or only unread.
    pub is_read: Option<bool>,
}

impl NotificationFilter {
    /// Whether a notification belongs in this listing.
    pub fn matches(&self, notification: &Notification) -> bool {
        notification.recipient_id == self.recipient_id
            && self.kind.is_none_or(|k| k == notification.kind)
            && self.is_read.is_none_or(|r| r == notification.is_read)
    }
}

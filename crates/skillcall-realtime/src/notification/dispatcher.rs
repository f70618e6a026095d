//! Notification dispatcher: persists a notification, then pushes it live.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use skillcall_core::result::AppResult;
use skillcall_core::types::Priority;
use skillcall_core::types::id::UserId;
use skillcall_database::CallStore;
use skillcall_entity::notification::{
    CreateNotification, Notification, NotificationData, NotificationType,
};

use crate::gateway::SignalingGateway;
use crate::room::user_room;

/// Live event name carrying the stored notification.
pub const NOTIFICATION_EVENT: &str = "notification";

/// A notification before it is stored.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub recipient_id: UserId,
    pub sender_id: Option<UserId>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub data: NotificationData,
    pub priority: Priority,
}

/// Creates notifications and forwards them to the recipient's room.
pub struct NotificationDispatcher {
    store: Arc<dyn CallStore>,
    gateway: SignalingGateway,
    ttl: Duration,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl NotificationDispatcher {
    /// Create a new dispatcher. Notifications become purgeable `ttl` after
    /// creation.
    pub fn new(store: Arc<dyn CallStore>, gateway: SignalingGateway, ttl: Duration) -> Self {
        Self {
            store,
            gateway,
            ttl,
        }
    }

    /// Store the notification, then push it to the recipient.
    ///
    /// A store failure is returned. Live delivery is best effort: if no
    /// socket takes the push the notification still waits to be polled.
    pub async fn notify(&self, draft: NotificationDraft) -> AppResult<Notification> {
        let now = Utc::now();
        let notification = Notification::from_create(
            CreateNotification {
                recipient_id: draft.recipient_id,
                sender_id: draft.sender_id,
                kind: draft.kind,
                title: draft.title,
                message: draft.message,
                data: draft.data,
                priority: draft.priority,
                expires_at: now + self.ttl,
            },
            now,
        );
        let mut notification = self.store.insert_notification(&notification).await?;

        let room = user_room(&notification.recipient_id);
        let payload = match serde_json::to_value(&notification) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(notification_id = %notification.id, error = %e, "Failed to encode notification push");
                return Ok(notification);
            }
        };

        if self.gateway.publish(&room, NOTIFICATION_EVENT, payload) > 0 {
            match self.store.mark_delivered_in_app(&notification.id).await {
                Ok(()) => notification.delivery_status.in_app = true,
                Err(e) => warn!(
                    notification_id = %notification.id,
                    error = %e,
                    "Failed to record in-app delivery"
                ),
            }
        }

        debug!(
            notification_id = %notification.id,
            recipient_id = %notification.recipient_id,
            kind = %notification.kind,
            in_app = notification.delivery_status.in_app,
            "Notification dispatched"
        );
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use skillcall_core::config::realtime::RealtimeConfig;

    use super::*;
    use crate::connection::ConnectionManager;
    use crate::message::OutboundMessage;
    use crate::room::RoomRegistry;
    use skillcall_database::MemoryStore;

    fn draft(to: &str) -> NotificationDraft {
        NotificationDraft {
            recipient_id: UserId::from(to),
            sender_id: Some(UserId::from("u2")),
            kind: NotificationType::VideoRequestDeclined,
            title: "Video Request Declined".to_string(),
            message: "Grace declined your video session request".to_string(),
            data: NotificationData::default(),
            priority: Priority::Medium,
        }
    }

    fn setup() -> (Arc<MemoryStore>, Arc<ConnectionManager>, NotificationDispatcher) {
        let store = Arc::new(MemoryStore::new());
        let connections = Arc::new(ConnectionManager::new(
            RealtimeConfig::default(),
            Arc::new(RoomRegistry::new()),
        ));
        let dispatcher = NotificationDispatcher::new(
            store.clone(),
            SignalingGateway::new(connections.clone()),
            Duration::days(30),
        );
        (store, connections, dispatcher)
    }

    #[tokio::test]
    async fn test_offline_recipient_still_gets_record() {
        let (store, _, dispatcher) = setup();
        let stored = dispatcher.notify(draft("u1")).await.expect("notify");
        assert!(!stored.delivery_status.in_app);
        assert_eq!(stored.expires_at - stored.created_at, Duration::days(30));
        assert_eq!(store.notifications_for(&UserId::from("u1")).await.len(), 1);
    }

    #[tokio::test]
    async fn test_online_recipient_gets_push_and_flag() {
        let (store, connections, dispatcher) = setup();
        let (_handle, mut rx) = connections.register(UserId::from("u1"));

        let stored = dispatcher.notify(draft("u1")).await.expect("notify");
        assert!(stored.delivery_status.in_app);

        match rx.recv().await {
            Some(OutboundMessage::Event { room, event, payload }) => {
                assert_eq!(room, "user-u1");
                assert_eq!(event, NOTIFICATION_EVENT);
                assert_eq!(payload["type"], "video_request_declined");
            }
            other => panic!("unexpected message: {other:?}"),
        }

        let persisted = store.notifications_for(&UserId::from("u1")).await;
        assert!(persisted[0].delivery_status.in_app);
    }
}

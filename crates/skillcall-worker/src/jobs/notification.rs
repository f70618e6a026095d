//! Notification retention.

use async_trait::async_trait;
use serde_json::Value;

use skillcall_core::result::AppResult;
use skillcall_service::NotificationService;

use super::MaintenanceJob;

/// Deletes notifications past their expiry.
#[derive(Debug)]
pub struct NotificationPurgeJob {
    notifications: NotificationService,
}

impl NotificationPurgeJob {
    pub fn new(notifications: NotificationService) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl MaintenanceJob for NotificationPurgeJob {
    fn name(&self) -> &'static str {
        "notification_purge"
    }

    async fn run(&self) -> AppResult<Value> {
        let removed = self.notifications.purge_expired().await?;
        Ok(serde_json::json!({ "task": self.name(), "expired_removed": removed }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use skillcall_core::types::Priority;
    use skillcall_core::types::id::UserId;
    use skillcall_database::{MemoryStore, NotificationStore};
    use skillcall_entity::notification::{
        CreateNotification, Notification, NotificationData, NotificationType,
    };

    use super::*;

    #[tokio::test]
    async fn test_purge_reports_removed_count() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        for (title, expires_at) in [("stale", now - Duration::hours(1)), ("fresh", now + Duration::days(1))] {
            let notification = Notification::from_create(
                CreateNotification {
                    recipient_id: UserId::from("u1"),
                    sender_id: None,
                    kind: NotificationType::SystemAnnouncement,
                    title: title.to_string(),
                    message: title.to_string(),
                    data: NotificationData::default(),
                    priority: Priority::Low,
                    expires_at,
                },
                now - Duration::days(30),
            );
            store.insert_notification(&notification).await.expect("insert");
        }

        let job = NotificationPurgeJob::new(NotificationService::new(store.clone()));
        let summary = job.run().await.expect("purge");
        assert_eq!(summary["expired_removed"], 1);

        let left = store.notifications_for(&UserId::from("u1")).await;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "fresh");
    }
}

//! Notification queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use skillcall_core::result::AppResult;
use skillcall_core::types::id::{NotificationId, UserId};
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_entity::notification::{Notification, NotificationFilter, NotificationType};

use super::{PgStore, db_error};
use crate::store::NotificationStore;

const FILTER: &str = "recipient_id = $1 \
                      AND ($2::notification_type IS NULL OR notification_type = $2) \
                      AND ($3::boolean IS NULL OR is_read = $3)";

#[async_trait]
impl NotificationStore for PgStore {
    async fn insert_notification(&self, notification: &Notification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, recipient_id, sender_id, notification_type, title, \
             message, data, is_read, read_at, priority, delivery_status, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(&notification.id)
        .bind(&notification.recipient_id)
        .bind(&notification.sender_id)
        .bind(notification.kind)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.data)
        .bind(notification.is_read)
        .bind(notification.read_at)
        .bind(notification.priority)
        .bind(&notification.delivery_status)
        .bind(notification.created_at)
        .bind(notification.expires_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_error("Failed to create notification", e))
    }

    async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM notifications WHERE {FILTER}"))
                .bind(&filter.recipient_id)
                .bind(filter.kind)
                .bind(filter.is_read)
                .fetch_one(self.pool())
                .await
                .map_err(|e| db_error("Failed to count notifications", e))?;

        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT * FROM notifications WHERE {FILTER} \
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.recipient_id)
        .bind(filter.kind)
        .bind(filter.is_read)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list notifications", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn count_unread(
        &self,
        recipient_id: &UserId,
        kind: Option<NotificationType>,
    ) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM notifications WHERE {FILTER}"
        ))
        .bind(recipient_id)
        .bind(kind)
        .bind(Some(false))
        .fetch_one(self.pool())
        .await
        .map_err(|e| db_error("Failed to count unread notifications", e))?;
        Ok(count as u64)
    }

    async fn mark_read(
        &self,
        id: &NotificationId,
        recipient_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND recipient_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(recipient_id)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to mark notification read", e))
    }

    async fn mark_all_read(&self, recipient_id: &UserId, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to mark all notifications read", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_notification(
        &self,
        id: &NotificationId,
        recipient_id: &UserId,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete notification", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_delivered_in_app(&self, id: &NotificationId) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications \
             SET delivery_status = jsonb_set(delivery_status, '{in_app}', 'true'::jsonb) \
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to record delivery", e))?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to purge notifications", e))?;
        Ok(result.rows_affected())
    }
}

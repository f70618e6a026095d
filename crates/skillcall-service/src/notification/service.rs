//! Notification queries and read-state management.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use skillcall_core::error::AppError;
use skillcall_core::result::AppResult;
use skillcall_core::types::id::NotificationId;
use skillcall_core::types::pagination::{PageRequest, PageResponse};
use skillcall_database::CallStore;
use skillcall_entity::notification::{Notification, NotificationFilter, NotificationType};

use crate::context::RequestContext;

/// A page of notifications plus the caller's unread total.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPage {
    #[serde(flatten)]
    pub page: PageResponse<Notification>,
    pub unread_count: u64,
}

/// Manages the caller's notifications.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn CallStore>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn CallStore>) -> Self {
        Self { store }
    }

    /// Lists notifications for the current user.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        kind: Option<NotificationType>,
        is_read: Option<bool>,
        page: PageRequest,
    ) -> AppResult<NotificationPage> {
        let filter = NotificationFilter {
            recipient_id: ctx.user_id.clone(),
            kind,
            is_read,
        };
        let page = self.store.list_notifications(&filter, page).await?;
        let unread_count = self.store.count_unread(&ctx.user_id, None).await?;
        Ok(NotificationPage { page, unread_count })
    }

    /// Gets the unread notification count, optionally for one type.
    pub async fn unread_count(
        &self,
        ctx: &RequestContext,
        kind: Option<NotificationType>,
    ) -> AppResult<u64> {
        self.store.count_unread(&ctx.user_id, kind).await
    }

    /// Marks a notification as read. Repeating the call changes nothing.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        id: &NotificationId,
    ) -> AppResult<Notification> {
        self.store
            .mark_read(id, &ctx.user_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let updated = self.store.mark_all_read(&ctx.user_id, Utc::now()).await?;
        info!(user_id = %ctx.user_id, count = updated, "Marked all notifications read");
        Ok(updated)
    }

    /// Deletes one of the caller's notifications.
    pub async fn delete(&self, ctx: &RequestContext, id: &NotificationId) -> AppResult<()> {
        if !self.store.delete_notification(id, &ctx.user_id).await? {
            return Err(AppError::not_found("Notification not found"));
        }
        Ok(())
    }

    /// Deletes notifications past their expiry.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let purged = self.store.purge_expired(Utc::now()).await?;
        if purged > 0 {
            info!(count = purged, "Purged expired notifications");
        }
        Ok(purged)
    }
}

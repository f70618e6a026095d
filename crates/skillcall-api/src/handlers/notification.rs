//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use skillcall_core::types::id::NotificationId;
use skillcall_entity::notification::{Notification, NotificationType};
use skillcall_service::NotificationPage;

use crate::dto::response::{ApiResponse, CountResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// Filters for the notification list and count.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub is_read: Option<bool>,
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<NotificationPage>>, ApiError> {
    let page = state
        .notifications
        .list(&auth, filter.kind, filter.is_read, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notifications.unread_count(&auth, filter.kind).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let notification = state.notifications.mark_read(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notifications.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.notifications.delete(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Notification deleted"))))
}

//! Call session handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use skillcall_core::types::id::SessionId;
use skillcall_core::types::pagination::PageResponse;
use skillcall_entity::session::SessionStatus;
use skillcall_service::{RoomAccess, RoomInfo, SessionView};

use crate::dto::request::{CreateSessionBody, FeedbackBody};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

type SessionResponse = Result<Json<ApiResponse<SessionView>>, ApiError>;

/// Filters for `GET /api/sessions`.
#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub status: Option<SessionStatus>,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateSessionBody>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>), ApiError> {
    let session = state.sessions.create(&auth, body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<SessionListQuery>,
) -> Result<Json<ApiResponse<PageResponse<SessionView>>>, ApiError> {
    let page = state
        .sessions
        .list(&auth, filter.status, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> SessionResponse {
    Ok(Json(ApiResponse::ok(state.sessions.get(&auth, &id).await?)))
}

/// POST /api/sessions/{id}/start
pub async fn start_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> SessionResponse {
    Ok(Json(ApiResponse::ok(state.sessions.start(&auth, &id).await?)))
}

/// POST /api/sessions/{id}/end
pub async fn end_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> SessionResponse {
    Ok(Json(ApiResponse::ok(state.sessions.end(&auth, &id).await?)))
}

/// POST /api/sessions/{id}/cancel
pub async fn cancel_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> SessionResponse {
    Ok(Json(ApiResponse::ok(state.sessions.cancel(&auth, &id).await?)))
}

/// POST /api/sessions/{id}/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> SessionResponse {
    Ok(Json(ApiResponse::ok(
        state.sessions.accept_invitation(&auth, &id).await?,
    )))
}

/// POST /api/sessions/{id}/decline
pub async fn decline_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> SessionResponse {
    Ok(Json(ApiResponse::ok(
        state.sessions.decline_invitation(&auth, &id).await?,
    )))
}

/// POST /api/sessions/{id}/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
    ValidatedJson(body): ValidatedJson<FeedbackBody>,
) -> SessionResponse {
    let session = state
        .sessions
        .submit_feedback(&auth, &id, body.rating, body.feedback)
        .await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/sessions/{id}/room-token
pub async fn issue_room_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> Result<Json<ApiResponse<RoomAccess>>, ApiError> {
    let access = state.sessions.issue_room_token(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(access)))
}

/// GET /api/sessions/{id}/room
pub async fn room_info(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<SessionId>,
) -> Result<Json<ApiResponse<RoomInfo>>, ApiError> {
    let info = state.sessions.room_info(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(info)))
}

//! Call request handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use skillcall_core::types::id::RequestId;
use skillcall_core::types::pagination::PageResponse;
use skillcall_entity::request::{CallRequest, RequestDirection, RequestStatus};
use skillcall_service::AcceptedRequest;

use crate::dto::request::{CreateVideoRequestBody, RespondBody};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson, validated};
use crate::state::AppState;

/// Filters for `GET /api/video-requests`.
#[derive(Debug, Deserialize)]
pub struct RequestListQuery {
    #[serde(default)]
    pub direction: RequestDirection,
    pub status: Option<RequestStatus>,
}

fn respond_body(body: Option<Json<RespondBody>>) -> Result<RespondBody, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    Ok(validated(body)?)
}

/// POST /api/video-requests
pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(body): ValidatedJson<CreateVideoRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<CallRequest>>), ApiError> {
    let request = state.requests.create(&auth, body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(request))))
}

/// GET /api/video-requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<RequestListQuery>,
) -> Result<Json<ApiResponse<PageResponse<CallRequest>>>, ApiError> {
    let page = state
        .requests
        .list(&auth, filter.direction, filter.status, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/video-requests/pending-count
pub async fn pending_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.requests.pending_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// GET /api/video-requests/{id}
pub async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
) -> Result<Json<ApiResponse<CallRequest>>, ApiError> {
    let request = state.requests.get(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// POST /api/video-requests/{id}/accept
pub async fn accept_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    body: Option<Json<RespondBody>>,
) -> Result<Json<ApiResponse<AcceptedRequest>>, ApiError> {
    let body = respond_body(body)?;
    let accepted = state.requests.accept(&auth, &id, body.into()).await?;
    Ok(Json(ApiResponse::ok(accepted)))
}

/// POST /api/video-requests/{id}/decline
pub async fn decline_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    body: Option<Json<RespondBody>>,
) -> Result<Json<ApiResponse<CallRequest>>, ApiError> {
    let body = respond_body(body)?;
    let declined = state.requests.decline(&auth, &id, body.into()).await?;
    Ok(Json(ApiResponse::ok(declined)))
}

/// POST /api/video-requests/{id}/schedule
pub async fn schedule_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RequestId>,
    body: Option<Json<RespondBody>>,
) -> Result<Json<ApiResponse<CallRequest>>, ApiError> {
    let body = respond_body(body)?;
    let scheduled = state.requests.schedule(&auth, &id, body.into()).await?;
    Ok(Json(ApiResponse::ok(scheduled)))
}

//! Route definitions for the SkillCall HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`; the
//! WebSocket upgrade lives at `/ws`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(request_routes())
        .merge(session_routes())
        .merge(notification_routes())
        .route("/health", get(handlers::health::health));

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Call request proposal and response
fn request_routes() -> Router<AppState> {
    use handlers::request::*;
    Router::new()
        .route("/video-requests", post(create_request).get(list_requests))
        .route("/video-requests/pending-count", get(pending_count))
        .route("/video-requests/{id}", get(get_request))
        .route("/video-requests/{id}/accept", post(accept_request))
        .route("/video-requests/{id}/decline", post(decline_request))
        .route("/video-requests/{id}/schedule", post(schedule_request))
}

/// Session lifecycle, feedback and call room
fn session_routes() -> Router<AppState> {
    use handlers::session::*;
    Router::new()
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/start", post(start_session))
        .route("/sessions/{id}/end", post(end_session))
        .route("/sessions/{id}/cancel", post(cancel_session))
        .route("/sessions/{id}/accept", post(accept_invitation))
        .route("/sessions/{id}/decline", post(decline_invitation))
        .route("/sessions/{id}/feedback", post(submit_feedback))
        .route("/sessions/{id}/room-token", post(issue_room_token))
        .route("/sessions/{id}/room", get(room_info))
}

/// Notification inbox
fn notification_routes() -> Router<AppState> {
    use handlers::notification::*;
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/{id}/read", put(mark_read))
        .route("/notifications/{id}", delete(delete_notification))
}

//! Application builder: wires stores, services and the realtime engine into
//! an [`AppState`], and the router plus middleware into an Axum app.

use std::sync::Arc;

use axum::Router;

use skillcall_auth::{JwtDecoder, LiveKitTokenIssuer};
use skillcall_core::config::AppConfig;
use skillcall_database::CallStore;
use skillcall_realtime::RealtimeEngine;
use skillcall_service::{NotificationService, RequestLifecycleManager, SessionLifecycleManager};

use crate::router::build_router;
use crate::state::AppState;

/// Build the shared state on top of `store`.
///
/// The lifecycle managers publish into the realtime engine's event bus;
/// call [`RealtimeEngine::start`] on `state.realtime` before serving so the
/// events reach the dispatcher and the gateway.
pub fn build_state(config: AppConfig, store: Arc<dyn CallStore>) -> AppState {
    let realtime = RealtimeEngine::new(&config.realtime, &config.call, store.clone());

    let sessions = Arc::new(SessionLifecycleManager::new(
        store.clone(),
        realtime.bus.clone(),
        Arc::new(LiveKitTokenIssuer::new(&config.room)),
        config.call.clone(),
    ));
    let requests = Arc::new(RequestLifecycleManager::new(
        store.clone(),
        realtime.bus.clone(),
        sessions.clone(),
        config.call.clone(),
    ));
    let notifications = NotificationService::new(store.clone());
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    AppState {
        config: Arc::new(config),
        store,
        jwt_decoder,
        requests,
        sessions,
        notifications,
        realtime,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

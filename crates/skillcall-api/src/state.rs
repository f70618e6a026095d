//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use skillcall_auth::JwtDecoder;
use skillcall_core::config::AppConfig;
use skillcall_database::CallStore;
use skillcall_realtime::RealtimeEngine;
use skillcall_service::{NotificationService, RequestLifecycleManager, SessionLifecycleManager};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Request, session and notification storage
    pub store: Arc<dyn CallStore>,
    /// Bearer token decoder
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Request lifecycle
    pub requests: Arc<RequestLifecycleManager>,
    /// Session lifecycle
    pub sessions: Arc<SessionLifecycleManager>,
    /// Notification read side
    pub notifications: NotificationService,
    /// WebSocket realtime engine
    pub realtime: RealtimeEngine,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish()
    }
}

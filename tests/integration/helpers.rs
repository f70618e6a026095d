//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use skillcall_api::{AppState, build_app, build_state};
use skillcall_auth::JwtEncoder;
use skillcall_core::config::AppConfig;
use skillcall_core::types::id::UserId;
use skillcall_database::MemoryStore;
use skillcall_entity::notification::Notification;
use skillcall_entity::user::UserProfile;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the realtime engine
    pub state: AppState,
    /// Backing store for direct inspection and clock rewinds
    pub store: Arc<MemoryStore>,
    encoder: JwtEncoder,
    _bridge: JoinHandle<()>,
}

impl TestApp {
    /// Create a new test application with users u1 (Ada), u2 (Grace) and
    /// u3 (Linus) in the directory.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestApp::new`], with config overrides applied first.
    pub async fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.worker.enabled = false;
        configure(&mut config);

        let store = Arc::new(MemoryStore::new());
        for (id, name) in [("u1", "Ada"), ("u2", "Grace"), ("u3", "Linus")] {
            store.add_user(UserProfile::new(id, name)).await;
        }

        let encoder = JwtEncoder::new(&config.auth);
        let state = build_state(config, store.clone());
        let bridge = state.realtime.start();
        let router = build_app(state.clone());

        Self {
            router,
            state,
            store,
            encoder,
            _bridge: bridge,
        }
    }

    /// Mint an access token for a directory user
    pub fn token(&self, user: &str) -> String {
        let name = match user {
            "u1" => "Ada",
            "u2" => "Grace",
            "u3" => "Linus",
            other => other,
        };
        self.encoder
            .issue_access_token(&UserId::from(user), name, "user")
            .expect("token")
            .0
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = match body {
            Some(body) => req
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&body).expect("serialize body"))),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Authenticated call as `user`
    pub async fn call(&self, user: &str, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let token = self.token(user);
        self.request(method, path, body, Some(&token)).await
    }

    /// `user` proposes a call to `to` and returns the request id.
    pub async fn propose(&self, user: &str, to: &str, topic: &str) -> String {
        let response = self
            .call(
                user,
                "POST",
                "/api/video-requests",
                Some(serde_json::json!({ "recipient_id": to, "topic": topic })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_str().expect("request id").to_string()
    }

    /// Wait until `user` has at least `count` stored notifications.
    ///
    /// Notifications are written by the event bridge task, after the
    /// triggering call has already returned.
    pub async fn notifications_for(&self, user: &str, count: usize) -> Vec<Notification> {
        let user = UserId::from(user);
        for _ in 0..100 {
            let rows = self.store.notifications_for(&user).await;
            if rows.len() >= count {
                return rows;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.store.notifications_for(&user).await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

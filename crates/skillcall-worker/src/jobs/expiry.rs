//! Request and session expiry sweep.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use skillcall_core::result::AppResult;
use skillcall_service::{RequestLifecycleManager, SessionLifecycleManager};

use super::MaintenanceJob;

/// Rewrites lapsed pending requests and overdue active sessions to expired.
///
/// Reads already treat both as expired; this pass makes the stored status
/// match and announces the forced session endings.
#[derive(Debug)]
pub struct ExpirySweepJob {
    requests: Arc<RequestLifecycleManager>,
    sessions: Arc<SessionLifecycleManager>,
}

impl ExpirySweepJob {
    pub fn new(
        requests: Arc<RequestLifecycleManager>,
        sessions: Arc<SessionLifecycleManager>,
    ) -> Self {
        Self { requests, sessions }
    }
}

#[async_trait]
impl MaintenanceJob for ExpirySweepJob {
    fn name(&self) -> &'static str {
        "expiry_sweep"
    }

    async fn run(&self) -> AppResult<Value> {
        let requests = self.requests.expire_lapsed().await?;
        let sessions = self.sessions.expire_overdue().await?;

        if requests > 0 || sessions > 0 {
            tracing::info!(requests, sessions, "Expiry sweep rewrote stale records");
        }

        Ok(serde_json::json!({
            "task": self.name(),
            "requests_expired": requests,
            "sessions_expired": sessions,
        }))
    }
}

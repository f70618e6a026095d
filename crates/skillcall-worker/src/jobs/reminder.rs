//! Starting-soon reminders for scheduled requests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use skillcall_core::result::AppResult;
use skillcall_service::RequestLifecycleManager;

use super::MaintenanceJob;

/// Announces scheduled calls that fall inside the reminder lead window.
/// Each request is claimed once, so repeated passes never double-notify.
#[derive(Debug)]
pub struct ReminderJob {
    requests: Arc<RequestLifecycleManager>,
}

impl ReminderJob {
    pub fn new(requests: Arc<RequestLifecycleManager>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl MaintenanceJob for ReminderJob {
    fn name(&self) -> &'static str {
        "starting_soon_reminders"
    }

    async fn run(&self) -> AppResult<Value> {
        let sent = self.requests.send_due_reminders().await?;
        Ok(serde_json::json!({ "task": self.name(), "reminders_sent": sent }))
    }
}

//! Sweep job implementations.

pub mod expiry;
pub mod notification;
pub mod reminder;

use async_trait::async_trait;
use serde_json::Value;

use skillcall_core::result::AppResult;

pub use expiry::ExpirySweepJob;
pub use notification::NotificationPurgeJob;
pub use reminder::ReminderJob;

/// A unit of periodic work. Returns a short JSON summary for the logs.
#[async_trait]
pub trait MaintenanceJob: Send + Sync + 'static {
    /// Stable name used in log lines.
    fn name(&self) -> &'static str;

    /// Run one pass.
    async fn run(&self) -> AppResult<Value>;
}

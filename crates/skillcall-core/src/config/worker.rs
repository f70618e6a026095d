//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Periodic sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the request/session expiry sweep.
    #[serde(default = "default_expiry_cron")]
    pub expiry_sweep_cron: String,
    /// Cron expression (with seconds) for the starting-soon reminder scan.
    #[serde(default = "default_reminder_cron")]
    pub reminder_cron: String,
    /// Cron expression (with seconds) for the notification purge.
    #[serde(default = "default_purge_cron")]
    pub notification_purge_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            expiry_sweep_cron: default_expiry_cron(),
            reminder_cron: default_reminder_cron(),
            notification_purge_cron: default_purge_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_expiry_cron() -> String {
    "0 * * * * *".to_string()
}

fn default_reminder_cron() -> String {
    "30 * * * * *".to_string()
}

fn default_purge_cron() -> String {
    "0 30 3 * * *".to_string()
}

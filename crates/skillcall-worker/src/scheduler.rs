//! Cron scheduler for the periodic sweeps.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use skillcall_core::config::worker::WorkerConfig;
use skillcall_core::error::AppError;

use crate::jobs::MaintenanceJob;

/// Cron-based scheduler for the maintenance jobs.
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, config })
    }

    /// Register the expiry sweep, the reminder scan, and the notification
    /// purge on their configured expressions.
    pub async fn register_default_tasks(
        &self,
        expiry: Arc<dyn MaintenanceJob>,
        reminders: Arc<dyn MaintenanceJob>,
        purge: Arc<dyn MaintenanceJob>,
    ) -> Result<(), AppError> {
        self.register(expiry, &self.config.expiry_sweep_cron).await?;
        self.register(reminders, &self.config.reminder_cron).await?;
        self.register(purge, &self.config.notification_purge_cron)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Run `job` on every tick of `schedule`. Failures are logged and the
    /// next tick retries.
    pub async fn register(
        &self,
        job: Arc<dyn MaintenanceJob>,
        schedule: &str,
    ) -> Result<(), AppError> {
        let name = job.name();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                tracing::debug!(job = job.name(), "Running scheduled job");
                match job.run().await {
                    Ok(summary) => tracing::debug!(job = job.name(), %summary, "Job finished"),
                    Err(e) => tracing::error!(job = job.name(), error = %e, "Job failed"),
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create {} schedule: {}", name, e)))?;

        self.scheduler
            .add(cron)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {} schedule: {}", name, e)))?;

        tracing::info!("Registered: {} ({})", name, schedule);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use skillcall_core::result::AppResult;

    use super::*;

    #[derive(Debug)]
    struct Idle;

    #[async_trait]
    impl MaintenanceJob for Idle {
        fn name(&self) -> &'static str {
            "idle"
        }

        async fn run(&self) -> AppResult<Value> {
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_rejects_malformed_expression() {
        let scheduler = CronScheduler::new(WorkerConfig::default())
            .await
            .expect("scheduler");
        let err = scheduler
            .register(Arc::new(Idle), "not a cron line")
            .await
            .expect_err("malformed");
        assert!(err.message.contains("idle"));
    }

    #[tokio::test]
    async fn test_registers_defaults() {
        let scheduler = CronScheduler::new(WorkerConfig::default())
            .await
            .expect("scheduler");
        scheduler
            .register_default_tasks(Arc::new(Idle), Arc::new(Idle), Arc::new(Idle))
            .await
            .expect("register");
    }
}

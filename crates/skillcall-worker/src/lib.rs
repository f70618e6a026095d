//! Scheduled maintenance for SkillCall.
//!
//! This crate provides:
//! - A cron scheduler that runs each sweep on its own expression
//! - Sweep jobs that expire lapsed requests and overdue sessions, send
//!   starting-soon reminders, and purge expired notifications

pub mod jobs;
pub mod scheduler;

pub use jobs::{ExpirySweepJob, MaintenanceJob, NotificationPurgeJob, ReminderJob};
pub use scheduler::CronScheduler;

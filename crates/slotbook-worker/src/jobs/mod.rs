//! Scheduled job trait and built-in jobs.

pub mod reaper;

use async_trait::async_trait;
use serde_json::Value;

use slotbook_core::error::AppError;

pub use reaper::ReaperJob;

/// A job the cron scheduler runs on a fixed schedule.
#[async_trait]
pub trait ScheduledJob: Send + Sync + std::fmt::Debug + 'static {
    /// Stable job name for logs.
    fn name(&self) -> &str;

    /// Six-field cron expression (with seconds).
    fn schedule(&self) -> &str;

    /// Run one iteration and return a summary for the log.
    async fn run(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, the next run will fail the same way
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, the next run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

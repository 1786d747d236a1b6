//! Periodic reclaim of abandoned bookings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;

use slotbook_core::config::ReaperConfig;
use slotbook_core::error::ErrorKind;
use slotbook_service::AbandonmentReaper;

use super::{JobExecutionError, ScheduledJob};

/// Runs [`AbandonmentReaper::reclaim_abandoned`] on the configured schedule.
#[derive(Clone)]
pub struct ReaperJob {
    reaper: Arc<AbandonmentReaper>,
    schedule: String,
    threshold: Duration,
}

impl std::fmt::Debug for ReaperJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaperJob")
            .field("schedule", &self.schedule)
            .field("threshold_minutes", &self.threshold.num_minutes())
            .finish()
    }
}

impl ReaperJob {
    /// Create the job from reaper configuration.
    pub fn new(reaper: Arc<AbandonmentReaper>, config: &ReaperConfig) -> Self {
        Self {
            reaper,
            schedule: config.schedule.clone(),
            threshold: config.threshold(),
        }
    }

    /// The reaper this job drives.
    pub fn reaper(&self) -> &Arc<AbandonmentReaper> {
        &self.reaper
    }
}

#[async_trait]
impl ScheduledJob for ReaperJob {
    fn name(&self) -> &str {
        "abandoned_booking_reaper"
    }

    fn schedule(&self) -> &str {
        &self.schedule
    }

    async fn run(&self) -> Result<Value, JobExecutionError> {
        let reclaimed = self
            .reaper
            .reclaim_abandoned(self.threshold)
            .await
            .map_err(|e| {
                if e.is_dependency() {
                    JobExecutionError::Transient(e.to_string())
                } else if e.kind == ErrorKind::Validation {
                    JobExecutionError::Permanent(e.to_string())
                } else {
                    JobExecutionError::Internal(e)
                }
            })?;

        Ok(serde_json::json!({
            "task": self.name(),
            "reclaimed": reclaimed,
        }))
    }
}

//! Cron scheduler for periodic background jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use slotbook_core::error::AppError;

use crate::jobs::{JobExecutionError, ScheduledJob};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Names of registered jobs
    registered: Vec<String>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("registered", &self.registered)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            registered: Vec::new(),
        })
    }

    /// Register a job on its own schedule
    pub async fn register(&mut self, job: Arc<dyn ScheduledJob>) -> Result<(), AppError> {
        let name = job.name().to_string();
        let schedule = job.schedule().to_string();

        let cron_job = CronJob::new_async(schedule.as_str(), move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                let started = std::time::Instant::now();
                match job.run().await {
                    Ok(summary) => tracing::info!(
                        job = job.name(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        summary = %summary,
                        "Scheduled job completed"
                    ),
                    Err(JobExecutionError::Transient(msg)) => {
                        tracing::warn!(job = job.name(), "Scheduled job failed, will retry next run: {msg}")
                    }
                    Err(e) => tracing::error!(job = job.name(), "Scheduled job failed: {e}"),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{schedule}' for job {name}: {e}"
            ))
        })?;

        self.scheduler
            .add(cron_job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(job = %name, schedule = %schedule, "Registered scheduled job");
        self.registered.push(name);
        Ok(())
    }

    /// Names of the registered jobs
    pub fn registered(&self) -> &[String] {
        &self.registered
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

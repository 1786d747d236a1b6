//! Scheduled background jobs for SlotBook.
//!
//! This crate provides:
//! - A cron scheduler that runs registered jobs on their schedules
//! - The job trait and its execution error type
//! - The abandonment reaper job

pub mod jobs;
pub mod scheduler;

pub use jobs::{JobExecutionError, ReaperJob, ScheduledJob};
pub use scheduler::CronScheduler;

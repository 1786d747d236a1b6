//! Abandonment reaper configuration.

use serde::{Deserialize, Serialize};

/// Settings for the scheduled reclaim of stale pending bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Whether the in-process scheduler runs the reaper.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds).
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Age after which a pending booking is considered abandoned, in minutes.
    #[serde(default = "default_threshold_minutes")]
    pub threshold_minutes: u64,
}

impl ReaperConfig {
    /// The staleness threshold as a duration.
    pub fn threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.threshold_minutes as i64)
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
            threshold_minutes: default_threshold_minutes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 */5 * * * *".to_string()
}

fn default_threshold_minutes() -> u64 {
    30
}

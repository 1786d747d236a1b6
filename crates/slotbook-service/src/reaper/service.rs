//! Bulk reclaim of stale pending bookings.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;
use slotbook_database::store::BookingStore;

/// Moves pending bookings older than a threshold to `abandoned`.
#[derive(Clone)]
pub struct AbandonmentReaper {
    bookings: Arc<dyn BookingStore>,
}

impl AbandonmentReaper {
    /// Creates a new reaper.
    pub fn new(bookings: Arc<dyn BookingStore>) -> Self {
        Self { bookings }
    }

    /// Reclaim every pending booking created more than `threshold` ago.
    pub async fn reclaim_abandoned(&self, threshold: Duration) -> AppResult<u64> {
        self.reclaim_before(Utc::now(), threshold).await
    }

    /// Reclaim relative to an explicit `now`.
    pub async fn reclaim_before(&self, now: DateTime<Utc>, threshold: Duration) -> AppResult<u64> {
        if threshold <= Duration::zero() {
            return Err(AppError::validation("threshold must be positive"));
        }

        let cutoff = now - threshold;
        let reclaimed = self.bookings.reclaim_pending_before(cutoff).await?;

        info!(
            reclaimed,
            threshold_minutes = threshold.num_minutes(),
            cutoff = %cutoff,
            "Abandoned bookings reclaimed"
        );
        Ok(reclaimed)
    }
}

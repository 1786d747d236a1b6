//! Session status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a scheduled session.
///
/// The booking core only ever creates sessions as `Scheduled`; the other
/// states are set by the scheduling back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Open for bookings.
    Scheduled,
    /// Called off.
    Canceled,
    /// Took place.
    Completed,
}

impl SessionStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Canceled => "canceled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

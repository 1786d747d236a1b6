//! Booking ledger configuration.

use serde::{Deserialize, Serialize};

/// Booking ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// ISO-4217 currency used when a request does not name one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Reject new bookings once a session's active bookings reach its capacity.
    #[serde(default = "default_true")]
    pub enforce_capacity: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            enforce_capacity: true,
        }
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_true() -> bool {
    true
}

//! Checkout attempt value type and metadata helpers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use slotbook_core::error::AppError;
use slotbook_core::types::id::BookingId;

/// Metadata key carrying the booking back-reference on a payment attempt.
pub const BOOKING_ID_METADATA_KEY: &str = "booking_id";

/// An external payment attempt opened for a booking.
///
/// Not persisted; the provider's metadata is the only durable link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutAttempt {
    /// Provider-side checkout session identifier.
    pub external_id: String,
    /// Hosted payment page.
    pub url: String,
    /// Booking being paid for.
    pub booking_id: BookingId,
    /// Amount sent to the provider, in minor units.
    pub amount_minor: i64,
    /// Currency sent to the provider.
    pub currency: String,
}

/// Build the metadata map for a booking's payment attempt.
pub fn booking_metadata(booking_id: BookingId) -> HashMap<String, String> {
    HashMap::from([(BOOKING_ID_METADATA_KEY.to_string(), booking_id.to_string())])
}

/// Read the booking back-reference from provider metadata.
pub fn booking_id_from_metadata(metadata: &HashMap<String, String>) -> Result<BookingId, AppError> {
    let raw = metadata.get(BOOKING_ID_METADATA_KEY).ok_or_else(|| {
        AppError::validation("Checkout session carries no booking_id metadata")
    })?;

    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid booking_id metadata '{raw}'")))
}

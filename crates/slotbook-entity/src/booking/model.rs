//! Booking entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use slotbook_core::types::id::{BookingId, CustomerId, SessionId};

use super::status::BookingStatus;

/// A customer's claim on a session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    /// Unique booking identifier.
    pub id: BookingId,
    /// Session being booked.
    pub session_id: SessionId,
    /// Customer, if known.
    pub customer_id: Option<CustomerId>,
    /// Current status.
    pub status: BookingStatus,
    /// Price in major currency units.
    pub price: f64,
    /// Upper-case ISO-4217 currency code.
    pub currency: String,
    /// Free-form notes from the customer.
    pub notes: Option<String>,
    /// Client-supplied deduplication token.
    pub idempotency_key: Option<String>,
    /// When the booking was created.
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a new booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    /// Session being booked.
    pub session_id: SessionId,
    /// Customer, if known.
    pub customer_id: Option<CustomerId>,
    /// Initial status (always `Pending` from the ledger).
    pub status: BookingStatus,
    /// Price in major currency units.
    pub price: f64,
    /// Currency code.
    pub currency: String,
    /// Notes.
    pub notes: Option<String>,
    /// Client-supplied deduplication token.
    pub idempotency_key: Option<String>,
}

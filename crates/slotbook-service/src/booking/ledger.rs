//! Booking creation and the pending-to-terminal state machine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use slotbook_core::config::BookingConfig;
use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::types::id::{BookingId, CustomerId, SessionId};
use slotbook_database::store::BookingStore;
use slotbook_entity::booking::{Booking, BookingStatus, CreateBooking};

/// Maximum accepted idempotency key length.
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Request to create a booking on an already-materialized session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBooking {
    /// Session being booked.
    pub session_id: Option<SessionId>,
    /// Customer, if known.
    pub customer_id: Option<CustomerId>,
    /// Initial status; only `pending` is accepted.
    pub status: Option<BookingStatus>,
    /// Price in major units (default 0).
    pub price: Option<f64>,
    /// Currency code (default from configuration).
    pub currency: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Client-supplied deduplication token.
    pub idempotency_key: Option<String>,
}

/// Owns booking records and their transitions.
#[derive(Clone)]
pub struct BookingLedger {
    bookings: Arc<dyn BookingStore>,
    default_currency: String,
    enforce_capacity: bool,
}

impl BookingLedger {
    /// Creates a new booking ledger.
    pub fn new(bookings: Arc<dyn BookingStore>, config: &BookingConfig) -> Self {
        Self {
            bookings,
            default_currency: config.default_currency.to_ascii_uppercase(),
            enforce_capacity: config.enforce_capacity,
        }
    }

    /// Check the caller-supplied fields of a booking request.
    ///
    /// Covers everything but the session, so callers can reject bad input
    /// before materializing a session for it.
    pub fn check_input(&self, req: &NewBooking) -> AppResult<()> {
        self.validate_input(req).map(|_| ())
    }

    fn validate_input(&self, req: &NewBooking) -> AppResult<ValidatedInput> {
        let status = req.status.unwrap_or(BookingStatus::Pending);
        if status != BookingStatus::Pending {
            return Err(AppError::validation(format!(
                "Bookings are created as pending, got '{status}'"
            )));
        }

        let price = req.price.unwrap_or(0.0);
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::validation(
                "price must be a finite, non-negative number",
            ));
        }

        Ok(ValidatedInput {
            status,
            price,
            currency: normalize_currency(req.currency.as_deref(), &self.default_currency)?,
            idempotency_key: normalize_idempotency_key(req.idempotency_key.as_deref())?,
        })
    }

    /// Create a `pending` booking.
    ///
    /// With an idempotency key, an existing booking carrying the same key is
    /// returned instead of inserting a second row. A key already used for a
    /// different session or customer fails with `Conflict`.
    pub async fn create_booking(&self, req: NewBooking) -> AppResult<Booking> {
        let session_id = req
            .session_id
            .ok_or_else(|| AppError::validation("session_id is required"))?;
        let input = self.validate_input(&req)?;

        let data = CreateBooking {
            session_id,
            customer_id: req.customer_id,
            status: input.status,
            price: input.price,
            currency: input.currency,
            notes: req.notes.filter(|n| !n.trim().is_empty()),
            idempotency_key: input.idempotency_key,
        };

        if let Some(key) = data.idempotency_key.as_deref() {
            if let Some(existing) = self.bookings.find_booking_by_idempotency_key(key).await? {
                return reuse_existing(existing, &data);
            }
        }

        match self.bookings.insert_booking(&data, self.enforce_capacity).await {
            Ok(booking) => {
                info!(
                    booking_id = %booking.id,
                    session_id = %booking.session_id,
                    price = booking.price,
                    currency = %booking.currency,
                    "Booking created"
                );
                Ok(booking)
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                let Some(key) = data.idempotency_key.as_deref() else {
                    return Err(e);
                };
                match self.bookings.find_booking_by_idempotency_key(key).await? {
                    Some(existing) => reuse_existing(existing, &data),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a booking.
    pub async fn get_booking(&self, id: BookingId) -> AppResult<Booking> {
        self.bookings
            .find_booking(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booking {id} not found")))
    }

    /// Mark a pending booking as paid.
    pub async fn confirm(&self, id: BookingId) -> AppResult<Booking> {
        self.transition(id, BookingStatus::Confirmed).await
    }

    /// Cancel a pending booking.
    pub async fn cancel(&self, id: BookingId) -> AppResult<Booking> {
        self.transition(id, BookingStatus::Canceled).await
    }

    /// Abandon a pending booking.
    pub async fn abandon(&self, id: BookingId) -> AppResult<Booking> {
        self.transition(id, BookingStatus::Abandoned).await
    }

    /// Move a pending booking to `target` with one conditional update.
    ///
    /// A terminal booking is left unchanged and the call fails with
    /// `InvalidState`.
    pub async fn transition(&self, id: BookingId, target: BookingStatus) -> AppResult<Booking> {
        if !BookingStatus::Pending.can_transition_to(target) {
            return Err(AppError::validation(format!(
                "'{target}' is not a valid transition target"
            )));
        }

        if let Some(updated) = self
            .bookings
            .update_booking_status(id, BookingStatus::Pending, target)
            .await?
        {
            info!(booking_id = %id, status = %target, "Booking transitioned");
            return Ok(updated);
        }

        let current = self.get_booking(id).await?;
        warn!(
            booking_id = %id,
            current = %current.status,
            target = %target,
            "Rejected transition on terminal booking"
        );
        Err(AppError::invalid_state(format!(
            "Booking {id} is {} and cannot become {target}",
            current.status
        )))
    }
}

struct ValidatedInput {
    status: BookingStatus,
    price: f64,
    currency: String,
    idempotency_key: Option<String>,
}

/// Return the booking already stored under the request's idempotency key,
/// provided it was made for the same session and customer.
fn reuse_existing(existing: Booking, data: &CreateBooking) -> AppResult<Booking> {
    if existing.session_id != data.session_id || existing.customer_id != data.customer_id {
        warn!(
            booking_id = %existing.id,
            "Idempotency key reused for a different session or customer"
        );
        return Err(AppError::conflict(
            "idempotency_key already belongs to a different booking",
        ));
    }
    info!(booking_id = %existing.id, "Returning booking for repeated idempotency key");
    Ok(existing)
}

fn normalize_currency(currency: Option<&str>, default: &str) -> AppResult<String> {
    let currency = match currency.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => default,
    };
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::validation(format!(
            "currency '{currency}' must be a 3-letter ISO-4217 code"
        )));
    }
    Ok(currency.to_ascii_uppercase())
}

fn normalize_idempotency_key(key: Option<&str>) -> AppResult<Option<String>> {
    let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(None);
    };
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::validation(format!(
            "idempotency_key must be at most {MAX_IDEMPOTENCY_KEY_LEN} characters"
        )));
    }
    Ok(Some(key.to_string()))
}

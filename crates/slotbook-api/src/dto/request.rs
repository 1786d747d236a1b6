//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use slotbook_core::error::AppError;
use slotbook_core::types::id::{BookingId, CustomerId, TemplateId};

/// Run `validator` rules and fold the failures into one validation error.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Create booking request body.
///
/// Every field is optional at the wire level so that missing inputs are
/// reported with the ledger's own messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Template the session is materialized from.
    pub template_id: Option<TemplateId>,
    /// Session start instant.
    pub start_time: Option<DateTime<Utc>>,
    /// Customer, if known.
    pub customer_id: Option<CustomerId>,
    /// Initial status; only `pending` is accepted.
    pub status: Option<String>,
    /// Price in major units.
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    /// Currency code.
    #[validate(length(equal = 3, message = "currency must be a 3-letter code"))]
    pub currency: Option<String>,
    /// Free-form notes.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Client-supplied deduplication token.
    #[validate(length(min = 1, max = 255))]
    pub idempotency_key: Option<String>,
}

/// Cancel booking request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingRequest {
    /// Booking to cancel.
    pub booking_id: BookingId,
}

/// Create checkout request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCheckoutRequest {
    /// Price in major units.
    pub price: f64,
    /// Currency code (default from configuration).
    pub currency: Option<String>,
    /// Line item description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Booking being paid for.
    pub booking_id: BookingId,
    /// Page the provider redirects back to.
    #[validate(url(message = "return_url must be an absolute URL"))]
    pub return_url: String,
    /// E-mail to prefill on the hosted page.
    #[validate(email(message = "customer_email is not a valid address"))]
    pub customer_email: Option<String>,
}

/// Verify checkout request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCheckoutRequest {
    /// Provider checkout session id from the success redirect.
    #[validate(length(min = 1, message = "session_id is required"))]
    pub session_id: String,
}

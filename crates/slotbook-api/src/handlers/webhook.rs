//! Payment provider webhook receiver.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{info, warn};

use slotbook_payment::webhook::SIGNATURE_HEADER;

use crate::dto::response::{ErrorMessage, WebhookAck};
use crate::error::log_error;
use crate::state::AppState;

/// POST /payment-webhook
///
/// The raw body is verified before it is parsed. Events that verify but
/// cannot be applied to a booking are acknowledged so the provider stops
/// redelivering them; store or provider outages answer `500` so it retries.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let event = match state.webhook_verifier.verify(&body, signature, Utc::now()) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err.message, "Rejected payment webhook");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorMessage { error: err.message }),
            )
                .into_response();
        }
    };

    match state.checkout.apply_event(&event).await {
        Ok(Some(booking)) => {
            info!(
                event_id = %event.id,
                booking_id = %booking.id,
                status = %booking.status,
                "Payment webhook applied"
            );
        }
        Ok(None) => {}
        Err(err) if err.is_dependency() => {
            log_error("Payment webhook", &err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage { error: err.message }),
            )
                .into_response();
        }
        Err(err) => {
            warn!(event_id = %event.id, error = %err.message, "Payment webhook not applicable");
        }
    }

    Json(WebhookAck { received: true }).into_response()
}

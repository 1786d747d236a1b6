//! Hosted checkout handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use slotbook_core::result::AppResult;
use slotbook_entity::booking::Booking;
use slotbook_entity::checkout::CheckoutAttempt;
use slotbook_service::StartCheckout;

use crate::dto::request::{CreateCheckoutRequest, VerifyCheckoutRequest, validate_request};
use crate::dto::response::{CheckoutResponse, ErrorMessage};
use crate::error::{ApiError, log_error, rejection_to_error};
use crate::state::AppState;

/// POST /create-checkout
///
/// Any failure, including a provider outage, is reported as `400 {error}`.
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CreateCheckoutRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(req)) => start(&state, req).await,
        Err(rejection) => Err(rejection_to_error(rejection)),
    };

    match result {
        Ok(attempt) => Json(CheckoutResponse {
            url: attempt.url,
            id: attempt.external_id,
        })
        .into_response(),
        Err(err) => {
            log_error("Create checkout", &err);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorMessage { error: err.message }),
            )
                .into_response()
        }
    }
}

async fn start(state: &AppState, req: CreateCheckoutRequest) -> AppResult<CheckoutAttempt> {
    validate_request(&req)?;
    state
        .checkout
        .start_checkout(StartCheckout {
            booking_id: req.booking_id,
            price: req.price,
            currency: req.currency,
            description: req.description,
            return_url: req.return_url,
            customer_email: req.customer_email,
        })
        .await
}

/// POST /verify-checkout
///
/// Settles the booking from the provider's record of the session; the
/// redirect itself proves nothing.
pub async fn verify_checkout(
    State(state): State<AppState>,
    payload: Result<Json<VerifyCheckoutRequest>, JsonRejection>,
) -> Result<Json<Booking>, ApiError> {
    let Json(req) = payload?;
    validate_request(&req)?;
    let booking = state
        .checkout
        .reconcile(&req.session_id)
        .await
        .inspect_err(|e| log_error("Verify checkout", e))?;
    Ok(Json(booking))
}

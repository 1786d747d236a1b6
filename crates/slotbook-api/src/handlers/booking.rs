//! Booking creation and cancellation handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;
use slotbook_entity::booking::{Booking, BookingStatus};
use slotbook_service::NewBooking;

use crate::dto::request::{CancelBookingRequest, CreateBookingRequest, validate_request};
use crate::error::{ApiError, ApiErrorResponse, log_error, rejection_to_error};
use crate::state::AppState;

/// Header consulted when the body carries no idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// POST /create-booking
///
/// Answers `200` on failure too, with an `{error, code}` body, so that
/// storefront clients only ever branch on the payload.
pub async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(req)) => create(&state, &headers, req).await,
        Err(rejection) => Err(rejection_to_error(rejection)),
    };

    match result {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => {
            log_error("Create booking", &err);
            ApiErrorResponse::from(&err).into_response()
        }
    }
}

async fn create(
    state: &AppState,
    headers: &HeaderMap,
    req: CreateBookingRequest,
) -> AppResult<Booking> {
    validate_request(&req)?;

    let status = req
        .status
        .as_deref()
        .map(str::parse::<BookingStatus>)
        .transpose()
        .map_err(AppError::validation)?;

    let idempotency_key = req.idempotency_key.or_else(|| {
        headers
            .get(IDEMPOTENCY_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    let mut booking = NewBooking {
        session_id: None,
        customer_id: req.customer_id,
        status,
        price: req.price,
        currency: req.currency,
        notes: req.notes,
        idempotency_key,
    };
    state.ledger.check_input(&booking)?;

    let session = state
        .materializer
        .materialize(req.template_id, req.start_time)
        .await?;

    booking.session_id = Some(session.id);
    state.ledger.create_booking(booking).await
}

/// POST /cancel-booking
pub async fn cancel_booking(
    State(state): State<AppState>,
    payload: Result<Json<CancelBookingRequest>, JsonRejection>,
) -> Result<Json<Booking>, ApiError> {
    let Json(req) = payload?;
    let booking = state.ledger.cancel(req.booking_id).await.inspect_err(|e| {
        log_error("Cancel booking", e);
    })?;
    Ok(Json(booking))
}

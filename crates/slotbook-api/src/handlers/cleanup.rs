//! Manual trigger for the abandonment reaper.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::dto::response::{CleanupResponse, ErrorMessage};
use crate::error::log_error;
use crate::state::AppState;

/// POST /cleanup-bookings
pub async fn cleanup_bookings(State(state): State<AppState>) -> Response {
    let threshold = state.config.reaper.threshold();

    match state.reaper.reclaim_abandoned(threshold).await {
        Ok(reclaimed) => Json(CleanupResponse {
            success: true,
            message: format!("Reclaimed {reclaimed} abandoned bookings"),
            reclaimed,
        })
        .into_response(),
        Err(err) => {
            log_error("Cleanup bookings", &err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage { error: err.message }),
            )
                .into_response()
        }
    }
}

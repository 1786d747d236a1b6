//! Route definitions for the SlotBook HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(booking_routes())
        .merge(checkout_routes())
        .route("/cleanup-bookings", post(handlers::cleanup::cleanup_bookings))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Booking creation and cancellation
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/create-booking", post(handlers::booking::create_booking))
        .route("/cancel-booking", post(handlers::booking::cancel_booking))
}

/// Hosted checkout, reconciliation, and provider webhooks
fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/create-checkout", post(handlers::checkout::create_checkout))
        .route("/verify-checkout", post(handlers::checkout::verify_checkout))
        .route("/payment-webhook", post(handlers::webhook::payment_webhook))
}

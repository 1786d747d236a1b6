//! Integration tests for the abandonment cleanup endpoint.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::Value;

use slotbook_core::types::id::BookingId;
use slotbook_database::BookingStore;
use slotbook_entity::booking::BookingStatus;

fn booking_id(booking: &Value) -> BookingId {
    booking["id"].as_str().unwrap().parse().unwrap()
}

async fn status_of(app: &helpers::TestApp, id: BookingId) -> BookingStatus {
    app.store.find_booking(id).await.unwrap().unwrap().status
}

#[tokio::test]
async fn test_cleanup_reclaims_stale_pending_bookings() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;
    let threshold = app.config.reaper.threshold();

    let stale = booking_id(
        &app.create_booking(template.id, "2025-01-01T10:00:00Z")
            .await,
    );
    let recent = booking_id(
        &app.create_booking(template.id, "2025-01-01T10:00:00Z")
            .await,
    );
    app.store
        .set_booking_created_at(stale, Utc::now() - threshold * 2)
        .await;
    app.store
        .set_booking_created_at(recent, Utc::now() - threshold / 2)
        .await;

    let response = app.request("POST", "/cleanup-bookings", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["reclaimed"], 1);
    assert!(response.body["message"].as_str().unwrap().contains('1'));

    assert_eq!(status_of(&app, stale).await, BookingStatus::Abandoned);
    assert_eq!(status_of(&app, recent).await, BookingStatus::Pending);

    let rerun = app.request("POST", "/cleanup-bookings", None).await;
    assert_eq!(rerun.body["reclaimed"], 0);
}

#[tokio::test]
async fn test_cleanup_leaves_confirmed_bookings() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;
    let booking = app
        .create_booking(template.id, "2025-01-01T10:00:00Z")
        .await;
    let id = booking_id(&booking);

    let checkout = app
        .request(
            "POST",
            "/create-checkout",
            Some(serde_json::json!({
                "price": 19.99,
                "booking_id": booking["id"],
                "return_url": "https://studio.test/book",
            })),
        )
        .await;
    let session_id = checkout.body["id"].as_str().unwrap().to_string();
    app.provider.mark_paid(&session_id).await;
    app.request(
        "POST",
        "/verify-checkout",
        Some(serde_json::json!({ "session_id": session_id })),
    )
    .await;

    app.store
        .set_booking_created_at(id, Utc::now() - Duration::days(1))
        .await;

    let response = app.request("POST", "/cleanup-bookings", None).await;
    assert_eq!(response.body["reclaimed"], 0);
    assert_eq!(status_of(&app, id).await, BookingStatus::Confirmed);
}

#[tokio::test]
async fn test_abandoned_booking_frees_capacity() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 1).await;
    let first = app
        .create_booking(template.id, "2025-02-02T08:00:00Z")
        .await;
    app.store
        .set_booking_created_at(booking_id(&first), Utc::now() - Duration::hours(2))
        .await;

    let full = app
        .request(
            "POST",
            "/create-booking",
            Some(serde_json::json!({
                "template_id": template.id,
                "start_time": "2025-02-02T08:00:00Z",
            })),
        )
        .await;
    assert_eq!(full.body["code"], "CAPACITY_EXCEEDED");

    app.request("POST", "/cleanup-bookings", None).await;
    app.create_booking(template.id, "2025-02-02T08:00:00Z")
        .await;
}

#[tokio::test]
async fn test_store_outage_is_500() {
    let app = helpers::TestApp::new().await;
    app.store.set_unavailable(true).await;

    let response = app.request("POST", "/cleanup-bookings", None).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["error"].is_string());
    assert!(response.body.get("success").is_none());
}

//! Integration tests for hosted checkout, reconciliation, and webhooks.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::Value;

use slotbook_core::types::id::BookingId;
use slotbook_database::BookingStore;

async fn pending_booking(app: &helpers::TestApp) -> Value {
    let template = app.create_template(60, 10).await;
    app.create_booking(template.id, "2025-01-01T10:00:00Z")
        .await
}

async fn open_checkout(app: &helpers::TestApp, booking: &Value) -> String {
    let response = app
        .request(
            "POST",
            "/create-checkout",
            Some(serde_json::json!({
                "price": 19.99,
                "currency": "EUR",
                "description": "Evening Yoga",
                "booking_id": booking["id"],
                "return_url": "https://studio.test/book",
                "customer_email": "ana@example.com",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body["id"].as_str().unwrap().to_string()
}

async fn booking_status(app: &helpers::TestApp, booking: &Value) -> String {
    let id: BookingId = booking["id"].as_str().unwrap().parse().unwrap();
    let booking = app.store.find_booking(id).await.unwrap().unwrap();
    booking.status.to_string()
}

#[tokio::test]
async fn test_create_checkout_returns_url_and_id() {
    let app = helpers::TestApp::new().await;
    let booking = pending_booking(&app).await;

    let response = app
        .request(
            "POST",
            "/create-checkout",
            Some(serde_json::json!({
                "price": 19.99,
                "currency": "EUR",
                "description": "Evening Yoga",
                "booking_id": booking["id"],
                "return_url": "https://studio.test/book",
                "customer_email": "ana@example.com",
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let id = response.body["id"].as_str().unwrap();
    let url = response.body["url"].as_str().unwrap();
    assert!(url.ends_with(id));

    let sent = app.provider.requests().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount_minor, 1999);
    assert_eq!(sent[0].currency, "eur");
    assert_eq!(
        sent[0].metadata.get("booking_id").map(String::as_str),
        booking["id"].as_str()
    );
    assert!(sent[0].cancel_url.starts_with("https://studio.test/book"));
    assert_eq!(booking_status(&app, &booking).await, "pending");
}

#[tokio::test]
async fn test_create_checkout_errors_are_400() {
    let app = helpers::TestApp::new().await;
    let booking = pending_booking(&app).await;

    let bad_price = app
        .request(
            "POST",
            "/create-checkout",
            Some(serde_json::json!({
                "price": -3,
                "booking_id": booking["id"],
                "return_url": "https://studio.test/book",
            })),
        )
        .await;
    assert_eq!(bad_price.status, StatusCode::BAD_REQUEST);
    assert!(bad_price.body["error"].is_string());
    assert!(bad_price.body.get("code").is_none());

    let missing_fields = app
        .request("POST", "/create-checkout", Some(serde_json::json!({})))
        .await;
    assert_eq!(missing_fields.status, StatusCode::BAD_REQUEST);

    let underpriced = app
        .request(
            "POST",
            "/create-checkout",
            Some(serde_json::json!({
                "price": 0.5,
                "booking_id": booking["id"],
                "return_url": "https://studio.test/book",
            })),
        )
        .await;
    assert_eq!(underpriced.status, StatusCode::BAD_REQUEST);
    assert!(app.provider.requests().await.is_empty());

    app.provider.set_unavailable(true).await;
    let outage = app
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
    assert_eq!(outage.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_checkout_confirms_only_after_payment() {
    let app = helpers::TestApp::new().await;
    let booking = pending_booking(&app).await;
    let session_id = open_checkout(&app, &booking).await;
    let body = serde_json::json!({ "session_id": session_id });

    let unpaid = app
        .request("POST", "/verify-checkout", Some(body.clone()))
        .await;
    assert_eq!(unpaid.status, StatusCode::OK);
    assert_eq!(unpaid.body["status"], "pending");

    app.provider.mark_paid(&session_id).await;
    let paid = app.request("POST", "/verify-checkout", Some(body)).await;
    assert_eq!(paid.status, StatusCode::OK);
    assert_eq!(paid.body["status"], "confirmed");

    let unknown = app
        .request(
            "POST",
            "/verify-checkout",
            Some(serde_json::json!({ "session_id": "cs_missing" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signed_completed_webhook_confirms_booking() {
    let app = helpers::TestApp::new().await;
    let booking = pending_booking(&app).await;
    let session_id = open_checkout(&app, &booking).await;
    let event = helpers::checkout_event(
        "checkout.session.completed",
        &session_id,
        booking["id"].as_str().unwrap(),
        "paid",
    );

    let response = app.post_webhook(&event, Utc::now()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["received"], true);
    assert_eq!(booking_status(&app, &booking).await, "confirmed");

    // Redelivery is harmless.
    let again = app.post_webhook(&event, Utc::now()).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(booking_status(&app, &booking).await, "confirmed");
}

#[tokio::test]
async fn test_expired_webhook_abandons_booking() {
    let app = helpers::TestApp::new().await;
    let booking = pending_booking(&app).await;
    let session_id = open_checkout(&app, &booking).await;
    let event = helpers::checkout_event(
        "checkout.session.expired",
        &session_id,
        booking["id"].as_str().unwrap(),
        "unpaid",
    );

    let response = app.post_webhook(&event, Utc::now()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(booking_status(&app, &booking).await, "abandoned");
}

#[tokio::test]
async fn test_bad_signature_rejected_without_changes() {
    let app = helpers::TestApp::new().await;
    let booking = pending_booking(&app).await;
    let session_id = open_checkout(&app, &booking).await;
    let event = helpers::checkout_event(
        "checkout.session.completed",
        &session_id,
        booking["id"].as_str().unwrap(),
        "paid",
    );

    let req = Request::builder()
        .method("POST")
        .uri("/payment-webhook")
        .header("Content-Type", "application/json")
        .header(
            "Stripe-Signature",
            format!("t={},v1={}", Utc::now().timestamp(), "00".repeat(32)),
        )
        .body(Body::from(event.to_string()))
        .unwrap();
    let forged = app.send(req).await;
    assert_eq!(forged.status, StatusCode::BAD_REQUEST);
    assert!(forged.body["error"].is_string());

    let unsigned = Request::builder()
        .method("POST")
        .uri("/payment-webhook")
        .body(Body::from(event.to_string()))
        .unwrap();
    assert_eq!(app.send(unsigned).await.status, StatusCode::BAD_REQUEST);

    let stale = app
        .post_webhook(&event, Utc::now() - Duration::minutes(10))
        .await;
    assert_eq!(stale.status, StatusCode::BAD_REQUEST);

    assert_eq!(booking_status(&app, &booking).await, "pending");
}

#[tokio::test]
async fn test_unrelated_webhook_is_acknowledged() {
    let app = helpers::TestApp::new().await;
    let event = serde_json::json!({
        "id": "evt_other",
        "type": "invoice.paid",
        "data": { "object": { "id": "in_1" } },
    });

    let response = app.post_webhook(&event, Utc::now()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["received"], true);
}

//! Integration tests for session materialization and booking creation.

mod helpers;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};

#[tokio::test]
async fn test_create_booking_materializes_session() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;

    let booking = app
        .create_booking(template.id, "2025-01-01T10:00:00Z")
        .await;

    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["price"], 19.99);
    assert_eq!(booking["currency"], "EUR");
    assert_eq!(app.store.session_count().await, 1);
}

#[tokio::test]
async fn test_same_slot_reuses_session() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(45, 10).await;

    let first = app
        .create_booking(template.id, "2025-03-10T18:00:00Z")
        .await;
    let second = app
        .create_booking(template.id, "2025-03-10T18:00:00Z")
        .await;

    assert_eq!(first["session_id"], second["session_id"]);
    assert_ne!(first["id"], second["id"]);
    assert_eq!(app.store.session_count().await, 1);
}

#[tokio::test]
async fn test_errors_are_reported_with_status_200() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/create-booking",
            Some(serde_json::json!({
                "template_id": uuid::Uuid::new_v4(),
                "start_time": "2025-01-01T10:00:00Z",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "NOT_FOUND");
    assert!(response.body["error"].as_str().unwrap().contains("not found"));

    let response = app
        .request(
            "POST",
            "/create-booking",
            Some(serde_json::json!({ "start_time": "2025-01-01T10:00:00Z" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_malformed_json_is_reported_with_status_200() {
    let app = helpers::TestApp::new().await;

    let req = Request::builder()
        .method("POST")
        .uri("/create-booking")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "VALIDATION");
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn test_non_pending_status_rejected() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;

    let response = app
        .request(
            "POST",
            "/create-booking",
            Some(serde_json::json!({
                "template_id": template.id,
                "start_time": "2025-01-01T10:00:00Z",
                "status": "confirmed",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_rejected_input_leaves_no_session_behind() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;

    let response = app
        .request(
            "POST",
            "/create-booking",
            Some(serde_json::json!({
                "template_id": template.id,
                "start_time": "2025-01-01T10:00:00Z",
                "currency": "1$%",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["code"], "VALIDATION");
    assert_eq!(app.store.session_count().await, 0);
}

#[tokio::test]
async fn test_idempotency_key_for_other_slot_conflicts() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;
    let body = |start: &str| {
        serde_json::json!({
            "template_id": template.id,
            "start_time": start,
            "idempotency_key": "cart-77",
        })
    };

    let first = app
        .request("POST", "/create-booking", Some(body("2025-01-01T10:00:00Z")))
        .await;
    assert!(first.body.get("error").is_none());

    let second = app
        .request("POST", "/create-booking", Some(body("2025-01-02T10:00:00Z")))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_idempotency_key_returns_existing_booking() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;
    let body = serde_json::json!({
        "template_id": template.id,
        "start_time": "2025-01-01T10:00:00Z",
        "idempotency_key": "cart-42",
    });

    let first = app
        .request("POST", "/create-booking", Some(body.clone()))
        .await;
    let second = app.request("POST", "/create-booking", Some(body)).await;
    assert_eq!(first.body["id"], second.body["id"]);

    // The header works when the body carries no key.
    let req = |key: &str| {
        Request::builder()
            .method("POST")
            .uri("/create-booking")
            .header("Content-Type", "application/json")
            .header("Idempotency-Key", key)
            .body(Body::from(
                serde_json::json!({
                    "template_id": template.id,
                    "start_time": "2025-01-01T10:00:00Z",
                })
                .to_string(),
            ))
            .unwrap()
    };
    let third = app.send(req("cart-43")).await;
    let fourth = app.send(req("cart-43")).await;
    assert_eq!(third.body["id"], fourth.body["id"]);
    assert_ne!(third.body["id"], first.body["id"]);
}

#[tokio::test]
async fn test_capacity_is_enforced() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 2).await;

    let first = app
        .create_booking(template.id, "2025-05-05T09:00:00Z")
        .await;
    app.create_booking(template.id, "2025-05-05T09:00:00Z")
        .await;

    let full = app
        .request(
            "POST",
            "/create-booking",
            Some(serde_json::json!({
                "template_id": template.id,
                "start_time": "2025-05-05T09:00:00Z",
            })),
        )
        .await;
    assert_eq!(full.status, StatusCode::OK);
    assert_eq!(full.body["code"], "CAPACITY_EXCEEDED");

    // Canceling frees a seat.
    let canceled = app
        .request(
            "POST",
            "/cancel-booking",
            Some(serde_json::json!({ "booking_id": first["id"] })),
        )
        .await;
    assert_eq!(canceled.status, StatusCode::OK);
    assert_eq!(canceled.body["status"], "canceled");

    app.create_booking(template.id, "2025-05-05T09:00:00Z")
        .await;
}

#[tokio::test]
async fn test_cancel_terminal_booking_conflicts() {
    let app = helpers::TestApp::new().await;
    let template = app.create_template(60, 10).await;
    let booking = app
        .create_booking(template.id, "2025-01-01T10:00:00Z")
        .await;
    let body = serde_json::json!({ "booking_id": booking["id"] });

    let first = app
        .request("POST", "/cancel-booking", Some(body.clone()))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app.request("POST", "/cancel-booking", Some(body)).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["code"], "INVALID_STATE");

    let missing = app
        .request(
            "POST",
            "/cancel-booking",
            Some(serde_json::json!({ "booking_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preflight_answers_every_route() {
    let app = helpers::TestApp::new().await;

    for path in [
        "/create-booking",
        "/cleanup-bookings",
        "/create-checkout",
        "/payment-webhook",
    ] {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri(path)
            .header("Origin", "https://studio.test")
            .header("Access-Control-Request-Method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.send(req).await;

        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert_eq!(
            response.headers["access-control-allow-origin"],
            "*",
            "{path}"
        );
    }
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert!(response.body["version"].is_string());
}

//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower::ServiceExt;

use slotbook_api::{AppState, StoreHandles};
use slotbook_core::config::{
    AppConfig, BookingConfig, DatabaseConfig, LoggingConfig, PaymentConfig, ReaperConfig,
    ServerConfig,
};
use slotbook_core::types::id::TemplateId;
use slotbook_database::MemoryStore;
use slotbook_entity::template::SessionTemplate;
use slotbook_payment::{MockPaymentProvider, WebhookVerifier};

/// Webhook secret shared by the test app and signed test payloads.
pub const WEBHOOK_SECRET: &str = "whsec_integration";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// In-memory store backing every repository
    pub store: MemoryStore,
    /// Mock payment provider
    pub provider: MockPaymentProvider,
    /// Application config
    pub config: AppConfig,
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty or not JSON)
    pub body: Value,
    /// Response headers
    pub headers: axum::http::HeaderMap,
}

/// Configuration used by every integration test
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused/slotbook".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        logging: LoggingConfig::default(),
        booking: BookingConfig::default(),
        payment: PaymentConfig {
            provider: "mock".to_string(),
            allow_mock_provider: true,
            webhook_secret: WEBHOOK_SECRET.to_string(),
            ..PaymentConfig::default()
        },
        reaper: ReaperConfig::default(),
    }
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application with a custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let provider = MockPaymentProvider::new();
        let shared = Arc::new(store.clone());

        let stores = StoreHandles {
            templates: shared.clone(),
            sessions: shared.clone(),
            bookings: shared,
        };
        let state = AppState::build(config.clone(), stores, Arc::new(provider.clone()))
            .expect("Failed to build app state");

        Self {
            router: slotbook_api::build_router(state),
            store,
            provider,
            config,
        }
    }

    /// Seed a session template and return it
    pub async fn create_template(&self, duration_minutes: i32, capacity: i32) -> SessionTemplate {
        let template = SessionTemplate {
            id: TemplateId::new(),
            name: "Evening Yoga".to_string(),
            duration_minutes,
            instructor_id: None,
            location_id: None,
            category_id: None,
            capacity,
            created_at: Utc::now(),
        };
        self.store.insert_template(template.clone()).await;
        template
    }

    /// Create a booking through the API and return the response body
    pub async fn create_booking(&self, template_id: TemplateId, start_time: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/create-booking",
                Some(serde_json::json!({
                    "template_id": template_id,
                    "start_time": start_time,
                    "price": 19.99,
                    "currency": "EUR",
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(
            response.body.get("error").is_none(),
            "Booking failed: {:?}",
            response.body
        );
        response.body
    }

    /// Make a JSON request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prebuilt request to the test app
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Post a webhook payload signed with the test secret at `signed_at`
    pub async fn post_webhook(&self, payload: &Value, signed_at: DateTime<Utc>) -> TestResponse {
        let raw = serde_json::to_vec(payload).expect("Failed to serialize payload");
        let timestamp = signed_at.timestamp();
        let signature = WebhookVerifier::new(WEBHOOK_SECRET, 300)
            .sign(timestamp, &raw)
            .expect("Failed to sign payload");

        let req = Request::builder()
            .method("POST")
            .uri("/payment-webhook")
            .header("Content-Type", "application/json")
            .header("Stripe-Signature", format!("t={timestamp},v1={signature}"))
            .body(Body::from(raw))
            .expect("Failed to build request");

        self.send(req).await
    }
}

/// Build a checkout-session event envelope
pub fn checkout_event(event_type: &str, session_id: &str, booking_id: &str, payment_status: &str) -> Value {
    serde_json::json!({
        "id": format!("evt_{}", uuid::Uuid::new_v4().simple()),
        "type": event_type,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "url": null,
                "payment_status": payment_status,
                "status": if event_type == "checkout.session.expired" { "expired" } else { "complete" },
                "metadata": { "booking_id": booking_id },
            }
        }
    })
}

//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Hosted checkout handle returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Hosted payment page.
    pub url: String,
    /// Provider checkout session id.
    pub id: String,
}

/// Result of a manual cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    /// Always `true` on this shape.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Number of bookings moved to `abandoned`.
    pub reclaimed: u64,
}

/// Bare `{error}` body used by the cleanup and checkout endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Human-readable message.
    pub error: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Always `true`.
    pub received: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

//! Verification of signed payment webhooks.
//!
//! The signature header has the form `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`
//! where each `v1` is an HMAC-SHA256 of `"<t>.<raw body>"` keyed with the
//! webhook secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::warn;

use slotbook_core::config::PaymentConfig;
use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;
use slotbook_core::traits::{CheckoutSession, PaymentEvent, PaymentEventKind};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

/// Verifies webhook signatures and decodes the event payload.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_seconds: u64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Create a verifier with an explicit secret and tolerance.
    pub fn new(secret: impl Into<String>, tolerance_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    /// Create a verifier from configuration.
    pub fn from_config(config: &PaymentConfig) -> AppResult<Self> {
        if config.webhook_secret.trim().is_empty() {
            return Err(AppError::configuration("payment.webhook_secret is required"));
        }
        Ok(Self::new(
            config.webhook_secret.trim(),
            config.webhook_tolerance_seconds,
        ))
    }

    /// Compute the hex signature for a timestamp and payload.
    pub fn sign(&self, timestamp: i64, payload: &[u8]) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid webhook secret: {e}")))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verify the signature header against the raw payload and decode the event.
    ///
    /// Every failure is a validation error; the caller answers 400.
    pub fn verify(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentEvent> {
        let (timestamp, signatures) = parse_header(signature_header)?;

        if now.timestamp().abs_diff(timestamp) > self.tolerance_seconds {
            warn!(timestamp, "Webhook timestamp outside tolerance");
            return Err(AppError::validation(
                "Webhook timestamp is outside the tolerance window",
            ));
        }

        let expected = self.sign(timestamp, payload)?;
        let matched = signatures
            .iter()
            .any(|sig| constant_time_eq::constant_time_eq(sig.as_bytes(), expected.as_bytes()));
        if !matched {
            warn!("Webhook signature mismatch");
            return Err(AppError::validation("Webhook signature does not match"));
        }

        decode_event(payload)
    }
}

/// Split the header into its timestamp and `v1` signatures.
fn parse_header(header: &str) -> AppResult<(i64, Vec<String>)> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    AppError::validation("Webhook signature timestamp is not a number")
                })?);
            }
            "v1" => signatures.push(value.to_ascii_lowercase()),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| AppError::validation("Webhook signature has no timestamp"))?;
    if signatures.is_empty() {
        return Err(AppError::validation("Webhook signature has no v1 entry"));
    }
    Ok((timestamp, signatures))
}

/// Decode a verified payload into a [`PaymentEvent`].
fn decode_event(payload: &[u8]) -> AppResult<PaymentEvent> {
    let envelope: EventEnvelope = serde_json::from_slice(payload)
        .map_err(|e| AppError::validation(format!("Malformed webhook payload: {e}")))?;

    let kind = PaymentEventKind::from_type(&envelope.event_type);
    let session = match kind {
        PaymentEventKind::Other(_) => None,
        _ => Some(
            serde_json::from_value::<CheckoutSession>(envelope.data.object).map_err(|e| {
                AppError::validation(format!("Webhook object is not a checkout session: {e}"))
            })?,
        ),
    };

    Ok(PaymentEvent {
        id: envelope.id,
        kind,
        session,
    })
}

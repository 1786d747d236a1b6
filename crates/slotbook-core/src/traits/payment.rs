//! Payment provider trait for hosted checkout sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Parameters for opening a hosted checkout session with the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    /// Amount in the currency's minor unit (e.g. cents).
    pub amount_minor: i64,
    /// Lower-case ISO-4217 currency code.
    pub currency: String,
    /// Line item description shown on the hosted page.
    pub description: String,
    /// Where the provider sends the customer after paying.
    pub success_url: String,
    /// Where the provider sends the customer after backing out.
    pub cancel_url: String,
    /// Optional e-mail to prefill on the hosted page.
    pub customer_email: Option<String>,
    /// Opaque key/value pairs echoed back by the provider.
    pub metadata: HashMap<String, String>,
}

/// Whether the provider has collected the money for a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPaymentStatus {
    /// Payment collected.
    Paid,
    /// Not (yet) paid.
    Unpaid,
    /// Nothing to collect (zero amount).
    NoPaymentRequired,
}

/// Lifecycle of the hosted checkout session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutSessionStatus {
    /// Customer can still complete it.
    Open,
    /// Customer completed the flow.
    Complete,
    /// The provider expired the session.
    Expired,
}

/// A checkout session as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider-side identifier.
    pub id: String,
    /// Hosted page URL (absent once the session is closed).
    pub url: Option<String>,
    /// Payment state.
    pub payment_status: CheckoutPaymentStatus,
    /// Session state.
    pub status: Option<CheckoutSessionStatus>,
    /// Metadata supplied at creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    /// Whether the provider reports the money as collected (or not required).
    pub fn is_paid(&self) -> bool {
        matches!(
            self.payment_status,
            CheckoutPaymentStatus::Paid | CheckoutPaymentStatus::NoPaymentRequired
        )
    }

    /// Whether the provider has expired the session.
    pub fn is_expired(&self) -> bool {
        self.status == Some(CheckoutSessionStatus::Expired)
    }
}

/// Kind of a provider-originated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEventKind {
    /// `checkout.session.completed`
    CheckoutCompleted,
    /// `checkout.session.async_payment_succeeded`
    AsyncPaymentSucceeded,
    /// `checkout.session.expired`
    CheckoutExpired,
    /// Any other event type.
    Other(String),
}

impl PaymentEventKind {
    /// Map a provider event type string to a kind.
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "checkout.session.completed" => Self::CheckoutCompleted,
            "checkout.session.async_payment_succeeded" => Self::AsyncPaymentSucceeded,
            "checkout.session.expired" => Self::CheckoutExpired,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A verified, provider-originated event about a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Provider event identifier.
    pub id: String,
    /// Event kind.
    pub kind: PaymentEventKind,
    /// The checkout session the event is about, for checkout event kinds.
    pub session: Option<CheckoutSession>,
}

/// Trait for hosted-checkout payment providers.
///
/// One instance is constructed per process and shared by `Arc`.
#[async_trait]
pub trait PaymentProvider: Send + Sync + 'static {
    /// Short provider name for logs.
    fn provider_name(&self) -> &str;

    /// Open a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession>;

    /// Fetch the current state of a checkout session.
    async fn retrieve_checkout_session(&self, external_id: &str) -> AppResult<CheckoutSession>;
}

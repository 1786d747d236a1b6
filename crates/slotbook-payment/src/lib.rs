//! # slotbook-payment
//!
//! Implementations of [`slotbook_core::traits::PaymentProvider`] and the
//! webhook signature verifier.
//!
//! - [`StripeProvider`] talks to the Stripe Checkout API over HTTPS.
//! - [`MockPaymentProvider`] keeps sessions in memory for tests and local runs.

pub mod mock;
pub mod stripe;
pub mod webhook;

use std::sync::Arc;

use slotbook_core::config::PaymentConfig;
use slotbook_core::error::AppError;
use slotbook_core::traits::PaymentProvider;

pub use mock::MockPaymentProvider;
pub use stripe::StripeProvider;
pub use webhook::WebhookVerifier;

/// Build the provider selected by `payment.provider`.
///
/// Fails with a configuration error when the provider is unknown or its
/// credential is missing.
pub fn build_provider(config: &PaymentConfig) -> Result<Arc<dyn PaymentProvider>, AppError> {
    match config.provider.as_str() {
        "stripe" => Ok(Arc::new(StripeProvider::new(config)?)),
        "mock" => Ok(Arc::new(MockPaymentProvider::new())),
        other => Err(AppError::configuration(format!(
            "Unknown payment provider '{other}'"
        ))),
    }
}

//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use slotbook_core::config::AppConfig;
use slotbook_core::result::AppResult;
use slotbook_core::traits::PaymentProvider;
use slotbook_database::store::{BookingStore, SessionStore, TemplateStore};
use slotbook_payment::WebhookVerifier;
use slotbook_service::{AbandonmentReaper, BookingLedger, CheckoutService, SessionMaterializer};

/// The three stores the services are built over.
#[derive(Clone)]
pub struct StoreHandles {
    /// Template lookups.
    pub templates: Arc<dyn TemplateStore>,
    /// Session lookup and insert.
    pub sessions: Arc<dyn SessionStore>,
    /// Booking ledger persistence.
    pub bookings: Arc<dyn BookingStore>,
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session materializer
    pub materializer: Arc<SessionMaterializer>,
    /// Booking ledger
    pub ledger: Arc<BookingLedger>,
    /// Checkout orchestrator
    pub checkout: Arc<CheckoutService>,
    /// Abandonment reaper
    pub reaper: Arc<AbandonmentReaper>,
    /// Webhook signature verifier
    pub webhook_verifier: Arc<WebhookVerifier>,
}

impl AppState {
    /// Wire the services over the given stores and payment provider.
    ///
    /// Fails with a configuration error when the webhook secret is missing.
    pub fn build(
        config: AppConfig,
        stores: StoreHandles,
        provider: Arc<dyn PaymentProvider>,
    ) -> AppResult<Self> {
        let webhook_verifier = Arc::new(WebhookVerifier::from_config(&config.payment)?);

        let materializer = Arc::new(SessionMaterializer::new(
            Arc::clone(&stores.templates),
            Arc::clone(&stores.sessions),
        ));
        let ledger = Arc::new(BookingLedger::new(
            Arc::clone(&stores.bookings),
            &config.booking,
        ));
        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&ledger),
            provider,
            config.booking.default_currency.clone(),
        ));
        let reaper = Arc::new(AbandonmentReaper::new(Arc::clone(&stores.bookings)));

        Ok(Self {
            config: Arc::new(config),
            materializer,
            ledger,
            checkout,
            reaper,
            webhook_verifier,
        })
    }
}

//! Opening hosted checkouts and settling them from provider-reported state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::traits::{CheckoutSessionRequest, PaymentEvent, PaymentEventKind, PaymentProvider};
use slotbook_core::types::id::BookingId;
use slotbook_entity::booking::{Booking, BookingStatus};
use slotbook_entity::checkout::{CheckoutAttempt, booking_id_from_metadata, booking_metadata};

use super::amount::to_minor_units;
use super::urls::build_redirect_urls;
use crate::booking::BookingLedger;

/// Request to open a hosted checkout for a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartCheckout {
    /// Booking being paid for.
    pub booking_id: BookingId,
    /// Price in major units.
    pub price: f64,
    /// Currency code (default from configuration).
    pub currency: Option<String>,
    /// Line item description.
    pub description: Option<String>,
    /// Page the provider redirects back to.
    pub return_url: String,
    /// E-mail to prefill on the hosted page.
    pub customer_email: Option<String>,
}

/// Orchestrates hosted checkout for pending bookings.
///
/// Never confirms a booking from caller input; confirmation only follows
/// provider-reported state via [`reconcile`](Self::reconcile) or
/// [`apply_event`](Self::apply_event).
#[derive(Clone)]
pub struct CheckoutService {
    ledger: Arc<BookingLedger>,
    provider: Arc<dyn PaymentProvider>,
    default_currency: String,
}

impl CheckoutService {
    /// Creates a new checkout service.
    pub fn new(
        ledger: Arc<BookingLedger>,
        provider: Arc<dyn PaymentProvider>,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            provider,
            default_currency: default_currency.into(),
        }
    }

    /// Open a hosted checkout for a pending booking.
    pub async fn start_checkout(&self, req: StartCheckout) -> AppResult<CheckoutAttempt> {
        let amount_minor = to_minor_units(req.price)?;
        let urls = build_redirect_urls(&req.return_url)?;

        let currency = match req.currency.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => self.default_currency.as_str(),
        };
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::validation(format!(
                "currency '{currency}' must be a 3-letter ISO-4217 code"
            )));
        }
        let currency = currency.to_ascii_lowercase();

        let booking = self.ledger.get_booking(req.booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(AppError::invalid_state(format!(
                "Booking {} is {} and cannot be paid",
                booking.id, booking.status
            )));
        }
        if to_minor_units(booking.price)? != amount_minor
            || !booking.currency.eq_ignore_ascii_case(&currency)
        {
            warn!(
                booking_id = %booking.id,
                amount_minor,
                currency = %currency,
                "Checkout amount does not match the booking"
            );
            return Err(AppError::validation(format!(
                "Checkout amount must match booking {} ({:.2} {})",
                booking.id, booking.price, booking.currency
            )));
        }

        let description = req
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Class booking".to_string());

        let request = CheckoutSessionRequest {
            amount_minor,
            currency: currency.clone(),
            description,
            success_url: urls.success_url,
            cancel_url: urls.cancel_url,
            customer_email: req
                .customer_email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            metadata: booking_metadata(booking.id),
        };

        let session = self.provider.create_checkout_session(&request).await?;
        let url = session.url.ok_or_else(|| {
            AppError::external_service("Payment provider returned no checkout URL")
        })?;

        info!(
            booking_id = %booking.id,
            external_id = %session.id,
            provider = self.provider.provider_name(),
            amount_minor,
            "Checkout session opened"
        );

        Ok(CheckoutAttempt {
            external_id: session.id,
            url,
            booking_id: booking.id,
            amount_minor,
            currency,
        })
    }

    /// Settle a booking from the provider's view of a checkout session.
    ///
    /// Paid sessions confirm the booking, expired ones abandon it; anything
    /// else leaves it as it is.
    pub async fn reconcile(&self, external_id: &str) -> AppResult<Booking> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(AppError::validation("session_id is required"));
        }

        let session = self.provider.retrieve_checkout_session(external_id).await?;
        let booking_id = booking_id_from_metadata(&session.metadata)?;

        if session.is_paid() {
            self.settle(booking_id, BookingStatus::Confirmed).await
        } else if session.is_expired() {
            self.settle(booking_id, BookingStatus::Abandoned).await
        } else {
            self.ledger.get_booking(booking_id).await
        }
    }

    /// Apply a verified provider event.
    ///
    /// Returns the affected booking, or `None` when the event does not
    /// concern a booking transition.
    pub async fn apply_event(&self, event: &PaymentEvent) -> AppResult<Option<Booking>> {
        let target = match event.kind {
            PaymentEventKind::CheckoutCompleted | PaymentEventKind::AsyncPaymentSucceeded => {
                BookingStatus::Confirmed
            }
            PaymentEventKind::CheckoutExpired => BookingStatus::Abandoned,
            PaymentEventKind::Other(ref event_type) => {
                info!(event_id = %event.id, event_type = %event_type, "Ignoring payment event");
                return Ok(None);
            }
        };

        let session = event.session.as_ref().ok_or_else(|| {
            AppError::validation(format!("Event {} carries no checkout session", event.id))
        })?;

        if target == BookingStatus::Confirmed && !session.is_paid() {
            // Delayed payment methods complete the session before the money arrives.
            info!(event_id = %event.id, external_id = %session.id, "Checkout completed but not yet paid");
            return Ok(None);
        }

        let booking_id = booking_id_from_metadata(&session.metadata)?;
        self.settle(booking_id, target).await.map(Some)
    }

    /// Transition a booking, treating an already-terminal booking as settled.
    async fn settle(&self, booking_id: BookingId, target: BookingStatus) -> AppResult<Booking> {
        match self.ledger.transition(booking_id, target).await {
            Ok(booking) => Ok(booking),
            Err(e) if e.kind == ErrorKind::InvalidState => {
                let current = self.ledger.get_booking(booking_id).await?;
                if current.status == target {
                    info!(booking_id = %booking_id, status = %target, "Payment state already applied");
                } else {
                    warn!(
                        booking_id = %booking_id,
                        current = %current.status,
                        reported = %target,
                        "Provider state disagrees with terminal booking"
                    );
                }
                Ok(current)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use slotbook_core::config::BookingConfig;
    use slotbook_core::traits::CheckoutSession;
    use slotbook_core::types::id::{SessionId, TemplateId};
    use slotbook_database::MemoryStore;
    use slotbook_database::store::SessionStore;
    use slotbook_entity::checkout::BOOKING_ID_METADATA_KEY;
    use slotbook_entity::session::CreateSession;
    use slotbook_entity::template::SessionTemplate;
    use slotbook_payment::MockPaymentProvider;

    use super::*;
    use crate::booking::NewBooking;

    struct Fixture {
        ledger: Arc<BookingLedger>,
        provider: MockPaymentProvider,
        checkout: CheckoutService,
        session_id: SessionId,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let template = SessionTemplate {
            id: TemplateId::new(),
            name: "Spin".to_string(),
            duration_minutes: 50,
            instructor_id: None,
            location_id: None,
            category_id: None,
            capacity: 20,
            created_at: Utc::now(),
        };
        store.insert_template(template.clone()).await;
        let start: DateTime<Utc> = "2025-04-01T07:00:00Z".parse().unwrap();
        let session = store
            .insert_session(&CreateSession::from_template(&template, start))
            .await
            .unwrap();

        let ledger = Arc::new(BookingLedger::new(
            Arc::new(store),
            &BookingConfig::default(),
        ));
        let provider = MockPaymentProvider::new();
        let checkout = CheckoutService::new(ledger.clone(), Arc::new(provider.clone()), "EUR");
        Fixture {
            ledger,
            provider,
            checkout,
            session_id: session.id,
        }
    }

    async fn pending_booking(f: &Fixture) -> Booking {
        f.ledger
            .create_booking(NewBooking {
                session_id: Some(f.session_id),
                price: Some(19.99),
                ..NewBooking::default()
            })
            .await
            .unwrap()
    }

    fn start(booking_id: BookingId, price: f64) -> StartCheckout {
        StartCheckout {
            booking_id,
            price,
            currency: None,
            description: Some("Spin class".to_string()),
            return_url: "https://studio.test/book".to_string(),
            customer_email: Some("ana@example.com".to_string()),
        }
    }

    fn event(kind: PaymentEventKind, session: CheckoutSession) -> PaymentEvent {
        PaymentEvent {
            id: "evt_1".to_string(),
            kind,
            session: Some(session),
        }
    }

    #[tokio::test]
    async fn test_start_checkout_sends_minor_units_and_metadata() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;

        let attempt = f.checkout.start_checkout(start(booking.id, 19.99)).await.unwrap();
        assert_eq!(attempt.amount_minor, 1999);
        assert_eq!(attempt.currency, "eur");

        let sent = f.provider.requests().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].amount_minor, 1999);
        assert_eq!(
            booking_id_from_metadata(&sent[0].metadata).unwrap(),
            booking.id
        );
        assert!(sent[0].success_url.contains("session_id={CHECKOUT_SESSION_ID}"));

        // The booking stays pending until the provider reports payment.
        let current = f.ledger.get_booking(booking.id).await.unwrap();
        assert_eq!(current.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_start_checkout_rejects_bad_input() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;

        let err = f.checkout.start_checkout(start(booking.id, -5.0)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut bad_url = start(booking.id, 5.0);
        bad_url.return_url = "/relative".to_string();
        let err = f.checkout.start_checkout(bad_url).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = f
            .checkout
            .start_checkout(start(BookingId::new(), 5.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(f.provider.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_checkout_rejects_amount_mismatch() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;

        let err = f.checkout.start_checkout(start(booking.id, 0.01)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut other_currency = start(booking.id, 19.99);
        other_currency.currency = Some("USD".to_string());
        let err = f.checkout.start_checkout(other_currency).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        assert!(f.provider.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_checkout_requires_pending_booking() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;
        f.ledger.cancel(booking.id).await.unwrap();

        let err = f.checkout.start_checkout(start(booking.id, 19.99)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_provider_outage_is_dependency_error() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;
        f.provider.set_unavailable(true).await;

        let err = f.checkout.start_checkout(start(booking.id, 19.99)).await.unwrap_err();
        assert!(err.is_dependency());
    }

    #[tokio::test]
    async fn test_reconcile_confirms_paid_session() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;
        let attempt = f.checkout.start_checkout(start(booking.id, 19.99)).await.unwrap();

        let unpaid = f.checkout.reconcile(&attempt.external_id).await.unwrap();
        assert_eq!(unpaid.status, BookingStatus::Pending);

        f.provider.mark_paid(&attempt.external_id).await;
        let paid = f.checkout.reconcile(&attempt.external_id).await.unwrap();
        assert_eq!(paid.status, BookingStatus::Confirmed);

        // A second reconcile is a no-op.
        let again = f.checkout.reconcile(&attempt.external_id).await.unwrap();
        assert_eq!(again.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_reconcile_abandons_expired_session() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;
        let attempt = f.checkout.start_checkout(start(booking.id, 19.99)).await.unwrap();

        f.provider.mark_expired(&attempt.external_id).await;
        let settled = f.checkout.reconcile(&attempt.external_id).await.unwrap();
        assert_eq!(settled.status, BookingStatus::Abandoned);
    }

    #[tokio::test]
    async fn test_apply_event_is_idempotent() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;
        let attempt = f.checkout.start_checkout(start(booking.id, 19.99)).await.unwrap();
        f.provider.mark_paid(&attempt.external_id).await;
        let session = f
            .provider
            .retrieve_checkout_session(&attempt.external_id)
            .await
            .unwrap();

        let completed = event(PaymentEventKind::CheckoutCompleted, session);
        let first = f.checkout.apply_event(&completed).await.unwrap().unwrap();
        assert_eq!(first.status, BookingStatus::Confirmed);
        let second = f.checkout.apply_event(&completed).await.unwrap().unwrap();
        assert_eq!(second.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_expired_event_does_not_undo_confirmation() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;
        f.ledger.confirm(booking.id).await.unwrap();

        let session = CheckoutSession {
            id: "cs_x".to_string(),
            url: None,
            payment_status: slotbook_core::traits::CheckoutPaymentStatus::Unpaid,
            status: Some(slotbook_core::traits::CheckoutSessionStatus::Expired),
            metadata: booking_metadata(booking.id),
        };
        let settled = f
            .checkout
            .apply_event(&event(PaymentEventKind::CheckoutExpired, session))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_unrelated_and_unpaid_events_are_ignored() {
        let f = fixture().await;
        let booking = pending_booking(&f).await;

        let other = PaymentEvent {
            id: "evt_2".to_string(),
            kind: PaymentEventKind::Other("invoice.paid".to_string()),
            session: None,
        };
        assert!(f.checkout.apply_event(&other).await.unwrap().is_none());

        let unpaid = CheckoutSession {
            id: "cs_y".to_string(),
            url: None,
            payment_status: slotbook_core::traits::CheckoutPaymentStatus::Unpaid,
            status: Some(slotbook_core::traits::CheckoutSessionStatus::Complete),
            metadata: booking_metadata(booking.id),
        };
        let result = f
            .checkout
            .apply_event(&event(PaymentEventKind::CheckoutCompleted, unpaid))
            .await
            .unwrap();
        assert!(result.is_none());
        let current = f.ledger.get_booking(booking.id).await.unwrap();
        assert_eq!(current.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_event_without_booking_metadata_rejected() {
        let f = fixture().await;
        let session = CheckoutSession {
            id: "cs_z".to_string(),
            url: None,
            payment_status: slotbook_core::traits::CheckoutPaymentStatus::Paid,
            status: Some(slotbook_core::traits::CheckoutSessionStatus::Complete),
            metadata: [(BOOKING_ID_METADATA_KEY.to_string(), "nope".to_string())]
                .into_iter()
                .collect(),
        };
        let err = f
            .checkout
            .apply_event(&event(PaymentEventKind::CheckoutCompleted, session))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}

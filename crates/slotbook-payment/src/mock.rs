//! In-memory payment provider for development and testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;
use slotbook_core::traits::{
    CheckoutPaymentStatus, CheckoutSession, CheckoutSessionRequest, CheckoutSessionStatus,
    PaymentProvider,
};

#[derive(Debug, Default)]
struct MockState {
    sessions: HashMap<String, CheckoutSession>,
    requests: Vec<CheckoutSessionRequest>,
    unavailable: bool,
}

/// Mock provider that opens sessions without any network call.
///
/// Sessions start `open`/`unpaid`; tests move them along with
/// [`mark_paid`](Self::mark_paid) and [`mark_expired`](Self::mark_expired).
#[derive(Debug, Clone, Default)]
pub struct MockPaymentProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockPaymentProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<CheckoutSessionRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Mark a session as paid and complete.
    pub async fn mark_paid(&self, external_id: &str) -> bool {
        self.update(external_id, |session| {
            session.payment_status = CheckoutPaymentStatus::Paid;
            session.status = Some(CheckoutSessionStatus::Complete);
            session.url = None;
        })
        .await
    }

    /// Mark a session as expired.
    pub async fn mark_expired(&self, external_id: &str) -> bool {
        self.update(external_id, |session| {
            session.status = Some(CheckoutSessionStatus::Expired);
            session.url = None;
        })
        .await
    }

    /// Toggle simulated provider outage.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    async fn update(&self, external_id: &str, f: impl FnOnce(&mut CheckoutSession)) -> bool {
        let mut state = self.state.lock().await;
        match state.sessions.get_mut(external_id) {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        let mut state = self.state.lock().await;
        if state.unavailable {
            return Err(AppError::external_service("Mock provider is unavailable"));
        }

        let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
        let payment_status = if request.amount_minor == 0 {
            CheckoutPaymentStatus::NoPaymentRequired
        } else {
            CheckoutPaymentStatus::Unpaid
        };
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://checkout.mock.local/pay/{id}")),
            payment_status,
            status: Some(CheckoutSessionStatus::Open),
            metadata: request.metadata.clone(),
        };

        info!(
            external_id = %id,
            amount_minor = request.amount_minor,
            currency = %request.currency,
            "Mock checkout session created"
        );

        state.requests.push(request.clone());
        state.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(&self, external_id: &str) -> AppResult<CheckoutSession> {
        let state = self.state.lock().await;
        if state.unavailable {
            return Err(AppError::external_service("Mock provider is unavailable"));
        }
        state
            .sessions
            .get(external_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Checkout session {external_id} not found")))
    }
}

//! Stripe Checkout client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, warn};

use slotbook_core::config::PaymentConfig;
use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::traits::{CheckoutSession, CheckoutSessionRequest, PaymentProvider};

/// Error envelope returned by the Stripe API.
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Payment provider backed by Stripe Checkout.
#[derive(Clone)]
pub struct StripeProvider {
    client: Client,
    secret_key: String,
    api_base_url: String,
}

impl std::fmt::Debug for StripeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProvider")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

impl StripeProvider {
    /// Create a provider from configuration.
    ///
    /// A missing secret key is a configuration error.
    pub fn new(config: &PaymentConfig) -> AppResult<Self> {
        let secret_key = config.secret_key.trim();
        if secret_key.is_empty() {
            return Err(AppError::configuration(
                "payment.secret_key is required for the stripe provider",
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build payment HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            secret_key: secret_key.to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Encode a checkout request as Stripe's bracketed form fields.
    fn form_fields(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut fields = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.description.clone(),
            ),
        ];

        if let Some(email) = &request.customer_email {
            fields.push(("customer_email".to_string(), email.clone()));
        }

        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            fields.push((format!("metadata[{key}]"), value.clone()));
        }

        fields
    }

    /// Turn a Stripe response into a session or an external-service error.
    async fn handle_response(response: reqwest::Response) -> AppResult<CheckoutSession> {
        match response.status() {
            status if status.is_success() => {
                response.json::<CheckoutSession>().await.map_err(|e| {
                    AppError::with_source(
                        ErrorKind::ExternalService,
                        "Failed to parse payment provider response",
                        e,
                    )
                })
            }
            StatusCode::UNAUTHORIZED => Err(AppError::external_service(
                "Payment provider rejected the API key",
            )),
            status => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<StripeErrorBody>(&body)
                    .ok()
                    .and_then(|b| {
                        b.error
                            .message
                            .or(b.error.kind)
                    })
                    .unwrap_or(body);
                warn!(status = status.as_u16(), message = %message, "Payment provider error");
                Err(AppError::external_service(format!(
                    "Payment provider returned {}: {message}",
                    status.as_u16()
                )))
            }
        }
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn provider_name(&self) -> &str {
        "stripe"
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> AppResult<CheckoutSession> {
        let body = serde_urlencoded::to_string(Self::form_fields(request)).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                "Failed to encode checkout request",
                e,
            )
        })?;

        debug!(
            amount_minor = request.amount_minor,
            currency = %request.currency,
            "Creating checkout session"
        );

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base_url))
            .bearer_auth(&self.secret_key)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Payment provider is unreachable",
                    e,
                )
            })?;

        Self::handle_response(response).await
    }

    async fn retrieve_checkout_session(&self, external_id: &str) -> AppResult<CheckoutSession> {
        if external_id.is_empty()
            || !external_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::validation(format!(
                "Invalid checkout session id '{external_id}'"
            )));
        }

        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{external_id}",
                self.api_base_url
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Payment provider is unreachable",
                    e,
                )
            })?;

        Self::handle_response(response).await
    }
}

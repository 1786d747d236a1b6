//! Payment provider configuration.

use serde::{Deserialize, Serialize};

/// Payment provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Provider implementation: `"stripe"` or `"mock"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Must be set for `provider = "mock"` to pass validation.
    #[serde(default)]
    pub allow_mock_provider: bool,
    /// Secret API key used to create and retrieve checkout sessions.
    #[serde(default)]
    pub secret_key: String,
    /// Shared secret used to verify webhook signatures.
    #[serde(default)]
    pub webhook_secret: String,
    /// Provider API base URL (overridable for tests and proxies).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Maximum accepted age of a signed webhook, in seconds.
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_seconds: u64,
    /// HTTP timeout for provider calls, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            allow_mock_provider: false,
            secret_key: String::new(),
            webhook_secret: String::new(),
            api_base_url: default_api_base_url(),
            webhook_tolerance_seconds: default_webhook_tolerance(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_provider() -> String {
    "stripe".to_string()
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_webhook_tolerance() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    15
}

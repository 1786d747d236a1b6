//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod booking;
pub mod database;
pub mod logging;
pub mod payment;
pub mod reaper;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::booking::BookingConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::payment::PaymentConfig;
pub use self::reaper::ReaperConfig;

use crate::error::AppError;

/// Environment variable selecting the configuration overlay.
pub const ENVIRONMENT_VAR: &str = "SLOTBOOK_ENV";

/// Overlay used when [`ENVIRONMENT_VAR`] is unset.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Resolve the overlay name, falling back to [`DEFAULT_ENVIRONMENT`].
pub fn resolve_environment(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Booking ledger settings.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Payment provider settings.
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Abandonment reaper settings.
    #[serde(default)]
    pub reaper: ReaperConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// and environment variables prefixed with `SLOTBOOK__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SLOTBOOK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Reject configurations the server cannot safely start with.
    ///
    /// A missing payment credential is fatal here rather than per request.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url is required"));
        }

        match self.payment.provider.as_str() {
            "stripe" => {
                if self.payment.secret_key.trim().is_empty() {
                    return Err(AppError::configuration(
                        "payment.secret_key is required for the stripe provider",
                    ));
                }
            }
            "mock" => {
                if !self.payment.allow_mock_provider {
                    return Err(AppError::configuration(
                        "payment.provider = \"mock\" requires payment.allow_mock_provider = true",
                    ));
                }
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown payment provider '{other}'"
                )));
            }
        }

        if self.payment.webhook_secret.trim().is_empty() {
            return Err(AppError::configuration("payment.webhook_secret is required"));
        }

        let currency = &self.booking.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::configuration(format!(
                "booking.default_currency '{currency}' is not an ISO-4217 code"
            )));
        }

        if self.reaper.threshold_minutes == 0 {
            return Err(AppError::configuration(
                "reaper.threshold_minutes must be greater than zero",
            ));
        }

        Ok(())
    }
}

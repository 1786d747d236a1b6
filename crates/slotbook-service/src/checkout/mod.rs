//! Checkout orchestration against the payment provider.

pub mod amount;
pub mod service;
pub mod urls;

pub use amount::to_minor_units;
pub use service::{CheckoutService, StartCheckout};
pub use urls::{RedirectUrls, build_redirect_urls};

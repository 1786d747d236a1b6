//! # slotbook-service
//!
//! The booking core. Each service works against the store traits from
//! `slotbook-database` and, for checkout, the payment provider trait from
//! `slotbook-core`.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod booking;
pub mod checkout;
pub mod reaper;
pub mod session;

pub use booking::{BookingLedger, NewBooking};
pub use checkout::{CheckoutService, StartCheckout};
pub use reaper::AbandonmentReaper;
pub use session::SessionMaterializer;

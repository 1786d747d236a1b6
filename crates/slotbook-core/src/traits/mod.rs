//! Core traits defined in `slotbook-core` and implemented by other crates.

pub mod payment;

pub use payment::{
    CheckoutPaymentStatus, CheckoutSession, CheckoutSessionRequest, CheckoutSessionStatus,
    PaymentEvent, PaymentEventKind, PaymentProvider,
};

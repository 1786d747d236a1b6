//! Reclaiming bookings whose payment never completed.

pub mod service;

pub use service::AbandonmentReaper;

//! Route handlers organized by domain.

pub mod booking;
pub mod checkout;
pub mod cleanup;
pub mod health;
pub mod webhook;

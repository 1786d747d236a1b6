//! Booking ledger and its state machine.

pub mod ledger;

pub use ledger::{BookingLedger, NewBooking};

//! Checkout value types.

pub mod attempt;

pub use attempt::{
    BOOKING_ID_METADATA_KEY, CheckoutAttempt, booking_id_from_metadata, booking_metadata,
};

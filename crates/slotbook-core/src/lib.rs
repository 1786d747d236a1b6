//! # slotbook-core
//!
//! Core crate for SlotBook. Contains configuration schemas, typed
//! identifiers, the payment provider trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other SlotBook crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

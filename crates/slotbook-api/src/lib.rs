//! # slotbook-api
//!
//! HTTP API layer for SlotBook built on Axum.
//!
//! Provides the booking, checkout, cleanup and webhook endpoints, the
//! CORS and logging middleware, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::{AppState, StoreHandles};

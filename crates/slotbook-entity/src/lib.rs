//! # slotbook-entity
//!
//! Domain entity models for SlotBook. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod booking;
pub mod checkout;
pub mod session;
pub mod template;

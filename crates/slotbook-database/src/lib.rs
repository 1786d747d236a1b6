//! # slotbook-database
//!
//! PostgreSQL connection management, the store traits the booking core is
//! written against, and two implementations of them: PostgreSQL
//! repositories and an in-memory store for tests and local runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{BookingStore, SessionStore, TemplateStore};

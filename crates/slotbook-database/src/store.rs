//! Store traits the booking core is written against.
//!
//! Two implementations are provided:
//! - PostgreSQL repositories (`crate::repositories`)
//! - An in-memory store (`crate::memory`) with the same constraint semantics

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use slotbook_core::result::AppResult;
use slotbook_core::types::id::{BookingId, SessionId, TemplateId};
use slotbook_entity::booking::{Booking, BookingStatus, CreateBooking};
use slotbook_entity::session::{CreateSession, Session};
use slotbook_entity::template::SessionTemplate;

/// Read-only access to session templates.
#[async_trait]
pub trait TemplateStore: Send + Sync + 'static {
    /// Find a template by ID.
    async fn find_template(&self, id: TemplateId) -> AppResult<Option<SessionTemplate>>;
}

/// Lookup and insert of concrete sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Find a session by ID.
    async fn find_session(&self, id: SessionId) -> AppResult<Option<Session>>;

    /// Find the session for a `(template, start_time)` key.
    async fn find_session_by_key(
        &self,
        template_id: TemplateId,
        start_time: DateTime<Utc>,
    ) -> AppResult<Option<Session>>;

    /// Insert a new session.
    ///
    /// Must fail with a `Conflict` error when a session for the same
    /// `(template_id, start_time)` already exists.
    async fn insert_session(&self, data: &CreateSession) -> AppResult<Session>;
}

/// Persistence for the booking ledger.
#[async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Find a booking by ID.
    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>>;

    /// Find a booking by its client-supplied idempotency key.
    async fn find_booking_by_idempotency_key(&self, key: &str) -> AppResult<Option<Booking>>;

    /// Insert a booking.
    ///
    /// Fails with `NotFound` if the session does not exist, with
    /// `CapacityExceeded` if `enforce_capacity` is set and the session's
    /// active bookings already reach its capacity, and with `Conflict` if
    /// the idempotency key is already taken. The capacity check and the
    /// insert are atomic with respect to other inserts for the session.
    async fn insert_booking(
        &self,
        data: &CreateBooking,
        enforce_capacity: bool,
    ) -> AppResult<Booking>;

    /// Move a booking from `from` to `to` in one conditional update.
    ///
    /// Returns `None` when the booking does not exist or is not in `from`;
    /// in that case nothing is written.
    async fn update_booking_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>>;

    /// Mark every `pending` booking created before `cutoff` as `abandoned`
    /// in a single atomic statement. Returns the number of rows changed.
    async fn reclaim_pending_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

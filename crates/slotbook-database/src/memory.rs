//! In-memory store using a Tokio mutex, for tests and single-node local runs.
//!
//! Mirrors the PostgreSQL constraints: the `(template_id, start_time)` key is
//! unique, idempotency keys are unique, and the capacity check plus insert
//! happen under one lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use slotbook_core::error::AppError;
use slotbook_core::result::AppResult;
use slotbook_core::types::id::{BookingId, SessionId, TemplateId};
use slotbook_entity::booking::{Booking, BookingStatus, CreateBooking};
use slotbook_entity::session::{CreateSession, Session, SessionStatus};
use slotbook_entity::template::SessionTemplate;

use crate::store::{BookingStore, SessionStore, TemplateStore};

/// Internal tables for the memory store.
#[derive(Debug, Default)]
struct Tables {
    templates: HashMap<TemplateId, SessionTemplate>,
    sessions: HashMap<SessionId, Session>,
    session_keys: HashMap<(TemplateId, DateTime<Utc>), SessionId>,
    bookings: HashMap<BookingId, Booking>,
    /// When set, every operation fails as if the database were down.
    unavailable: bool,
}

impl Tables {
    fn check_available(&self) -> AppResult<()> {
        if self.unavailable {
            return Err(AppError::database("Store is unavailable"));
        }
        Ok(())
    }

    fn active_bookings(&self, session_id: SessionId) -> i64 {
        self.bookings
            .values()
            .filter(|b| b.session_id == session_id && b.status.is_active())
            .count() as i64
    }
}

/// In-memory implementation of all three store traits.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a template.
    pub async fn insert_template(&self, template: SessionTemplate) {
        let mut tables = self.tables.lock().await;
        tables.templates.insert(template.id, template);
    }

    /// Number of sessions materialized so far.
    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }

    /// Overwrite a booking's `created_at`, used to age bookings in tests.
    pub async fn set_booking_created_at(&self, id: BookingId, created_at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.bookings.get_mut(&id) {
            Some(booking) => {
                booking.created_at = created_at;
                true
            }
            None => false,
        }
    }

    /// Toggle simulated unavailability.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.tables.lock().await.unavailable = unavailable;
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn find_template(&self, id: TemplateId) -> AppResult<Option<SessionTemplate>> {
        let tables = self.tables.lock().await;
        tables.check_available()?;
        Ok(tables.templates.get(&id).cloned())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find_session(&self, id: SessionId) -> AppResult<Option<Session>> {
        let tables = self.tables.lock().await;
        tables.check_available()?;
        Ok(tables.sessions.get(&id).cloned())
    }

    async fn find_session_by_key(
        &self,
        template_id: TemplateId,
        start_time: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let tables = self.tables.lock().await;
        tables.check_available()?;
        Ok(tables
            .session_keys
            .get(&(template_id, start_time))
            .and_then(|id| tables.sessions.get(id))
            .cloned())
    }

    async fn insert_session(&self, data: &CreateSession) -> AppResult<Session> {
        let mut tables = self.tables.lock().await;
        tables.check_available()?;

        let key = (data.template_id, data.start_time);
        if tables.session_keys.contains_key(&key) {
            return Err(AppError::conflict(format!(
                "Session for template {} at {} already exists",
                data.template_id, data.start_time
            )));
        }

        let session = Session {
            id: SessionId::new(),
            template_id: data.template_id,
            instructor_id: data.instructor_id,
            location_id: data.location_id,
            category_id: data.category_id,
            start_time: data.start_time,
            end_time: data.end_time,
            capacity: data.capacity,
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
        };
        tables.session_keys.insert(key, session.id);
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        tables.check_available()?;
        Ok(tables.bookings.get(&id).cloned())
    }

    async fn find_booking_by_idempotency_key(&self, key: &str) -> AppResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        tables.check_available()?;
        Ok(tables
            .bookings
            .values()
            .find(|b| b.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn insert_booking(
        &self,
        data: &CreateBooking,
        enforce_capacity: bool,
    ) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        tables.check_available()?;

        let Some(capacity) = tables.sessions.get(&data.session_id).map(|s| s.capacity) else {
            return Err(AppError::not_found(format!(
                "Session {} not found",
                data.session_id
            )));
        };

        if enforce_capacity {
            let active = tables.active_bookings(data.session_id);
            if active >= i64::from(capacity) {
                return Err(AppError::capacity_exceeded(format!(
                    "Session {} is full ({active}/{capacity})",
                    data.session_id
                )));
            }
        }

        if let Some(key) = data.idempotency_key.as_deref() {
            if tables
                .bookings
                .values()
                .any(|b| b.idempotency_key.as_deref() == Some(key))
            {
                return Err(AppError::conflict(
                    "A booking with this idempotency key already exists",
                ));
            }
        }

        let now = Utc::now();
        let booking = Booking {
            id: BookingId::new(),
            session_id: data.session_id,
            customer_id: data.customer_id,
            status: data.status,
            price: data.price,
            currency: data.currency.clone(),
            notes: data.notes.clone(),
            idempotency_key: data.idempotency_key.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut tables = self.tables.lock().await;
        tables.check_available()?;

        match tables.bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                booking.updated_at = Utc::now();
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn reclaim_pending_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        tables.check_available()?;

        let now = Utc::now();
        let mut reclaimed = 0u64;
        for booking in tables.bookings.values_mut() {
            if booking.status == BookingStatus::Pending && booking.created_at < cutoff {
                booking.status = BookingStatus::Abandoned;
                booking.updated_at = now;
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }
}

//! Booking repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::types::id::BookingId;
use slotbook_entity::booking::{Booking, BookingStatus, CreateBooking};

use super::is_unique_violation;
use crate::store::BookingStore;

/// Repository for the booking ledger.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Create a new booking repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn find_booking(&self, id: BookingId) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find booking", e))
    }

    async fn find_booking_by_idempotency_key(&self, key: &str) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE idempotency_key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find booking by idempotency key",
                    e,
                )
            })
    }

    async fn insert_booking(
        &self,
        data: &CreateBooking,
        enforce_capacity: bool,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // Row lock serializes concurrent inserts for the same session.
        let lock_sql = if enforce_capacity {
            "SELECT capacity FROM sessions WHERE id = $1 FOR UPDATE"
        } else {
            "SELECT capacity FROM sessions WHERE id = $1"
        };
        let capacity: Option<i32> = sqlx::query_scalar(lock_sql)
            .bind(data.session_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read session", e))?;

        let Some(capacity) = capacity else {
            return Err(AppError::not_found(format!(
                "Session {} not found",
                data.session_id
            )));
        };

        if enforce_capacity {
            let active: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings \
                 WHERE session_id = $1 AND status IN ('pending', 'confirmed')",
            )
            .bind(data.session_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count bookings", e)
            })?;

            if active >= i64::from(capacity) {
                return Err(AppError::capacity_exceeded(format!(
                    "Session {} is full ({active}/{capacity})",
                    data.session_id
                )));
            }
        }

        let booking = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, session_id, customer_id, status, price, currency, \
             notes, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(BookingId::new())
        .bind(data.session_id)
        .bind(data.customer_id)
        .bind(data.status)
        .bind(data.price)
        .bind(&data.currency)
        .bind(&data.notes)
        .bind(&data.idempotency_key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::with_source(
                    ErrorKind::Conflict,
                    "A booking with this idempotency key already exists",
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create booking", e)
            }
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit booking", e)
        })?;

        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update booking status", e)
        })
    }

    async fn reclaim_pending_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'abandoned', updated_at = NOW() \
             WHERE status = 'pending' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reclaim stale bookings", e)
        })?;

        Ok(result.rows_affected())
    }
}

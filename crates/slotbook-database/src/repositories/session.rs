//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::types::id::{SessionId, TemplateId};
use slotbook_entity::session::{CreateSession, Session, SessionStatus};

use super::is_unique_violation;
use crate::store::SessionStore;

/// Repository for session lookup and idempotent-key inserts.
///
/// The `(template_id, start_time)` uniqueness is enforced by the
/// `sessions_template_start_key` constraint, not by this code.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn find_session(&self, id: SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn find_session_by_key(
        &self,
        template_id: TemplateId,
        start_time: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE template_id = $1 AND start_time = $2",
        )
        .bind(template_id)
        .bind(start_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find session by key", e)
        })
    }

    async fn insert_session(&self, data: &CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, template_id, instructor_id, location_id, category_id, \
             start_time, end_time, capacity, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(SessionId::new())
        .bind(data.template_id)
        .bind(data.instructor_id)
        .bind(data.location_id)
        .bind(data.category_id)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.capacity)
        .bind(SessionStatus::Scheduled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::with_source(
                    ErrorKind::Conflict,
                    format!(
                        "Session for template {} at {} already exists",
                        data.template_id, data.start_time
                    ),
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create session", e)
            }
        })
    }
}

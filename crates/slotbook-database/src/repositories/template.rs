//! Session template repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::types::id::TemplateId;
use slotbook_entity::template::SessionTemplate;

use crate::store::TemplateStore;

/// Repository for read-only template lookups.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for TemplateRepository {
    async fn find_template(&self, id: TemplateId) -> AppResult<Option<SessionTemplate>> {
        sqlx::query_as::<_, SessionTemplate>(
            "SELECT id, name, duration_minutes, instructor_id, location_id, category_id, \
             capacity, created_at FROM session_templates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find template", e))
    }
}

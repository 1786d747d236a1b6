//! Idempotent `(template, start_time)` to session materialization.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use slotbook_core::error::{AppError, ErrorKind};
use slotbook_core::result::AppResult;
use slotbook_core::types::id::TemplateId;
use slotbook_database::store::{SessionStore, TemplateStore};
use slotbook_entity::session::{CreateSession, Session};

/// Turns a template plus a start instant into exactly one persisted session.
///
/// Uniqueness of `(template_id, start_time)` is owned by the store. When two
/// callers race, the loser's insert comes back as a conflict and the winner's
/// row is read and returned instead.
#[derive(Clone)]
pub struct SessionMaterializer {
    templates: Arc<dyn TemplateStore>,
    sessions: Arc<dyn SessionStore>,
}

impl SessionMaterializer {
    /// Creates a new session materializer.
    pub fn new(templates: Arc<dyn TemplateStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            templates,
            sessions,
        }
    }

    /// Normalize a start instant to the store's microsecond resolution.
    pub fn normalize_start(start_time: DateTime<Utc>) -> DateTime<Utc> {
        start_time.trunc_subsecs(6)
    }

    /// Return the session for `(template_id, start_time)`, creating it if needed.
    pub async fn materialize(
        &self,
        template_id: Option<TemplateId>,
        start_time: Option<DateTime<Utc>>,
    ) -> AppResult<Session> {
        let template_id =
            template_id.ok_or_else(|| AppError::validation("template_id is required"))?;
        let start_time =
            start_time.ok_or_else(|| AppError::validation("start_time is required"))?;
        let start_time = Self::normalize_start(start_time);

        let template = self
            .templates
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Template {template_id} not found")))?;

        if let Some(existing) = self
            .sessions
            .find_session_by_key(template_id, start_time)
            .await?
        {
            debug!(session_id = %existing.id, template_id = %template_id, "Reusing session");
            return Ok(existing);
        }

        let data = CreateSession::from_template(&template, start_time);
        match self.sessions.insert_session(&data).await {
            Ok(session) => {
                info!(
                    session_id = %session.id,
                    template_id = %template_id,
                    start_time = %start_time,
                    "Session materialized"
                );
                Ok(session)
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                debug!(template_id = %template_id, "Lost session insert race, re-reading");
                self.sessions
                    .find_session_by_key(template_id, start_time)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal(format!(
                            "Session for template {template_id} at {start_time} conflicted but cannot be read"
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }
}

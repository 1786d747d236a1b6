//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use slotbook_core::types::id::{CategoryId, InstructorId, LocationId, SessionId, TemplateId};

use super::status::SessionStatus;
use crate::template::SessionTemplate;

/// One concrete, time-bound occurrence of a template.
///
/// Instructor, location, category and capacity are copied from the
/// template when the session is created and never re-derived.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Template this occurrence was derived from.
    pub template_id: TemplateId,
    /// Instructor at creation time.
    pub instructor_id: Option<InstructorId>,
    /// Location at creation time.
    pub location_id: Option<LocationId>,
    /// Category at creation time.
    pub category_id: Option<CategoryId>,
    /// Start instant (UTC, microsecond precision).
    pub start_time: DateTime<Utc>,
    /// End instant (`start_time` + template duration).
    pub end_time: DateTime<Utc>,
    /// Capacity at creation time.
    pub capacity: i32,
    /// Current status.
    pub status: SessionStatus,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Template reference.
    pub template_id: TemplateId,
    /// Copied instructor.
    pub instructor_id: Option<InstructorId>,
    /// Copied location.
    pub location_id: Option<LocationId>,
    /// Copied category.
    pub category_id: Option<CategoryId>,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant.
    pub end_time: DateTime<Utc>,
    /// Copied capacity.
    pub capacity: i32,
}

impl CreateSession {
    /// Derive the insert payload for an occurrence of `template` at `start_time`.
    pub fn from_template(template: &SessionTemplate, start_time: DateTime<Utc>) -> Self {
        Self {
            template_id: template.id,
            instructor_id: template.instructor_id,
            location_id: template.location_id,
            category_id: template.category_id,
            start_time,
            end_time: template.end_time_for(start_time),
            capacity: template.capacity,
        }
    }
}

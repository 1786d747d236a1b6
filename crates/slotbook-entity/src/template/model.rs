//! Session template entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use slotbook_core::types::id::{CategoryId, InstructorId, LocationId, TemplateId};

/// A recurring class definition.
///
/// Templates are maintained outside the booking core; this crate only
/// reads them to derive concrete sessions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionTemplate {
    /// Unique template identifier.
    pub id: TemplateId,
    /// Display name, used as the checkout line item fallback.
    pub name: String,
    /// Length of each occurrence in minutes.
    pub duration_minutes: i32,
    /// Instructor teaching the class.
    pub instructor_id: Option<InstructorId>,
    /// Where the class takes place.
    pub location_id: Option<LocationId>,
    /// Class category.
    pub category_id: Option<CategoryId>,
    /// Maximum number of active bookings per occurrence.
    pub capacity: i32,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

impl SessionTemplate {
    /// Duration of one occurrence.
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.duration_minutes))
    }

    /// End instant of an occurrence starting at `start_time`.
    pub fn end_time_for(&self, start_time: DateTime<Utc>) -> DateTime<Utc> {
        start_time + self.duration()
    }
}

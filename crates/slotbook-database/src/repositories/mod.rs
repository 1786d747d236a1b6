//! PostgreSQL repository implementations for the SlotBook store traits.

pub mod booking;
pub mod session;
pub mod template;

pub use booking::BookingRepository;
pub use session::SessionRepository;
pub use template::TemplateRepository;

/// Whether a sqlx error is a PostgreSQL unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

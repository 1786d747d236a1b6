//! Convenience result type alias for SlotBook.

use crate::error::AppError;

/// A specialized `Result` type for SlotBook operations.
pub type AppResult<T> = Result<T, AppError>;

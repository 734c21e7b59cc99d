//! Convenience result type alias for TicketDesk.

use crate::error::AppError;

/// A specialized `Result` type for TicketDesk operations.
pub type AppResult<T> = Result<T, AppError>;

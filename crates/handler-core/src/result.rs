//! Convenience result type alias for chef-handler.

use crate::error::AppError;

/// A specialized `Result` type for chef-handler operations.
pub type AppResult<T> = Result<T, AppError>;

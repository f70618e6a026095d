//! Convenience result type alias for SkillCall.

use crate::error::AppError;

/// A specialized `Result` type for SkillCall operations.
pub type AppResult<T> = Result<T, AppError>;

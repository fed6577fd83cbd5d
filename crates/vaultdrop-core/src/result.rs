//! Convenience result type alias for VaultDrop.

use crate::error::AppError;

/// A specialized `Result` type for VaultDrop operations.
pub type AppResult<T> = Result<T, AppError>;

//! Typed path parameter helpers.

use vaultdrop_core::error::AppError;

/// Parses a file index from a path segment.
pub fn parse_index(s: &str) -> Result<i32, AppError> {
    s.parse::<i32>()
        .ok()
        .filter(|i| *i >= 0)
        .ok_or_else(|| AppError::validation(format!("Invalid file index: {s}")))
}

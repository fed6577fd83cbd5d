//! Side-effect-free checks applied before any storage or registry call.

use std::collections::HashSet;

use uuid::Uuid;

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;

use crate::token::TokenGenerator;

/// Longest accepted filename, in bytes.
pub const MAX_FILENAME_BYTES: usize = 255;

/// Content type recorded when the client reports none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Prefix under which every object of a transfer is stored.
pub fn key_prefix(token: &str) -> String {
    format!("uploads/{token}/")
}

/// Fresh storage key for one file of a transfer.
///
/// The random component keeps two files with the same name apart and makes
/// the final key unguessable from the filename alone.
pub fn storage_key(token: &str, filename: &str) -> String {
    format!("{}{}_{}", key_prefix(token), Uuid::new_v4(), filename)
}

/// Reject filenames that could not be used as the last segment of a key.
pub fn validate_filename(filename: &str) -> AppResult<()> {
    if filename.trim().is_empty() {
        return Err(AppError::validation("Filename must not be empty"));
    }
    if filename.len() > MAX_FILENAME_BYTES {
        return Err(AppError::validation(format!(
            "Filename exceeds {MAX_FILENAME_BYTES} bytes: {filename}"
        )));
    }
    if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
        return Err(AppError::validation(format!(
            "Filename must not contain path separators: {filename}"
        )));
    }
    if filename.chars().any(char::is_control) {
        return Err(AppError::validation("Filename must not contain control characters"));
    }
    Ok(())
}

/// Reject a token that is empty or not URL-safe base64.
pub fn validate_token(token: &str) -> AppResult<()> {
    if token.is_empty() {
        return Err(AppError::validation("Missing token"));
    }
    if !TokenGenerator::is_well_formed(token) {
        return Err(AppError::validation("Malformed token"));
    }
    Ok(())
}

/// Sum of reported sizes, rejected when it exceeds `cap`.
pub fn check_total<I>(sizes: I, cap: u64) -> AppResult<u64>
where
    I: IntoIterator<Item = u64>,
{
    let total = sizes
        .into_iter()
        .try_fold(0u64, |acc, size| acc.checked_add(size))
        .ok_or_else(|| size_limit_error(cap))?;

    if total > cap {
        return Err(size_limit_error(cap));
    }
    Ok(total)
}

/// Error reported when the size cap is exceeded.
pub fn size_limit_error(cap: u64) -> AppError {
    AppError::validation(format!(
        "Total upload size exceeds the {} limit",
        human_size(cap)
    ))
}

/// Every key must sit directly under the token's prefix and appear once.
pub fn validate_keys<'a, I>(token: &str, keys: I) -> AppResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = key_prefix(token);
    let mut seen = HashSet::new();

    for key in keys {
        let name = key
            .strip_prefix(&prefix)
            .ok_or_else(|| AppError::validation(format!("Key does not belong to this transfer: {key}")))?;
        if name.is_empty() || name.contains('/') {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        if !seen.insert(key) {
            return Err(AppError::validation(format!("Duplicate storage key: {key}")));
        }
    }
    Ok(())
}

/// Resolve the index of every file.
///
/// Indices are either all absent (files are numbered by position) or all
/// present, in which case they must be exactly `0..n` in some order.
pub fn resolve_indices(indices: &[Option<i32>]) -> AppResult<Vec<i32>> {
    let explicit = indices.iter().filter(|i| i.is_some()).count();

    if explicit == 0 {
        return (0..indices.len())
            .map(|i| i32::try_from(i).map_err(|_| AppError::validation("Too many files")))
            .collect();
    }
    if explicit != indices.len() {
        return Err(AppError::validation(
            "File indices must be given for all files or none",
        ));
    }

    let n = indices.len() as i64;
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(indices.len());
    for index in indices.iter().flatten().copied() {
        if index < 0 || i64::from(index) >= n {
            return Err(AppError::validation(format!("File index {index} is out of range")));
        }
        if !seen.insert(index) {
            return Err(AppError::validation(format!("Duplicate file index {index}")));
        }
        resolved.push(index);
    }
    Ok(resolved)
}

/// Normalize a client-reported content type.
pub fn normalize_content_type(content_type: Option<&str>) -> String {
    match content_type.map(str::trim) {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

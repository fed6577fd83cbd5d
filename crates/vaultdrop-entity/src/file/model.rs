//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded object within a transfer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Owning transfer.
    pub transfer_id: Uuid,
    /// Original file name as supplied by the uploader.
    pub filename: String,
    /// Size in bytes.
    pub size: i64,
    /// Storage locator. Never returned to share recipients.
    #[serde(skip_serializing)]
    pub storage_key: String,
    /// MIME type reported by the uploader.
    pub content_type: String,
    /// Zero-based position within the transfer.
    #[sqlx(rename = "file_index")]
    pub index: i32,
    /// Soft-delete flag.
    pub deleted: bool,
    /// When the file was registered.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Descriptor for a file committed together with its transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFile {
    /// Original file name.
    pub filename: String,
    /// Size in bytes.
    pub size: i64,
    /// Storage key the object was written under.
    pub storage_key: String,
    /// MIME type.
    pub content_type: String,
    /// Zero-based position.
    pub index: i32,
}

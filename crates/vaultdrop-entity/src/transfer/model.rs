//! Transfer entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A batch of files shared under one token with one expiry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transfer {
    /// Unique transfer identifier.
    pub id: Uuid,
    /// Unguessable URL-safe share token.
    pub token: String,
    /// Sum of the sizes of the files committed with this transfer.
    pub total_size: i64,
    /// Whether the token alone grants access.
    pub is_anonymous: bool,
    /// Owner of the transfer, if it was created by a signed-in user.
    pub sender_id: Option<Uuid>,
    /// When the share link stops resolving.
    pub expires_at: DateTime<Utc>,
    /// Soft-delete flag.
    pub deleted: bool,
    /// When the transfer was committed.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Transfer {
    /// Whether the link has lapsed at `now`.
    ///
    /// A transfer is still valid at the exact instant of `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether access requires a recipient grant.
    pub fn requires_recipient(&self) -> bool {
        !self.is_anonymous
    }

    /// Whether `user_id` created this transfer.
    pub fn is_sent_by(&self, user_id: Uuid) -> bool {
        self.sender_id == Some(user_id)
    }
}

/// Data required to create a new transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransfer {
    /// Share token.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Total size of the files committed alongside.
    pub total_size: i64,
    /// Whether the token alone grants access.
    pub is_anonymous: bool,
    /// Creating user.
    pub sender_id: Option<Uuid>,
}

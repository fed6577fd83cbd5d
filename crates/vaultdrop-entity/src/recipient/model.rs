//! Recipient entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Grants one user access to a transfer and carries their wrapped content key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipient {
    /// Unique grant identifier.
    pub id: Uuid,
    /// Transfer being shared.
    pub transfer_id: Uuid,
    /// Authorized user.
    pub receiver_id: Uuid,
    /// Content key wrapped under the receiver's public key. Opaque to the server.
    pub encrypted_key: String,
    /// When the grant was written.
    pub created_at: DateTime<Utc>,
}

/// Data required to grant a recipient access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipient {
    /// Authorized user.
    pub receiver_id: Uuid,
    /// Wrapped content key, stored verbatim.
    pub encrypted_key: String,
}

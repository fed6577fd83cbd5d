//! Identity of the caller making a request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated caller, resolved from the session token.
///
/// Services receive `Option<&Caller>`; `None` means an anonymous request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The username carried in the session token.
    pub username: String,
}

impl Caller {
    /// Creates a caller identity.
    pub fn new(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

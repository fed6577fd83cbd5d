//! The ordered gate every share operation passes through.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_database::store::TransferStore;
use vaultdrop_entity::recipient::Recipient;
use vaultdrop_entity::transfer::Transfer;

use crate::context::Caller;
use crate::token::TokenGenerator;

/// A transfer the caller may open.
#[derive(Debug, Clone)]
pub struct ShareAccess {
    /// The resolved transfer.
    pub transfer: Transfer,
    /// The caller's grant. Present only for recipient-gated transfers.
    pub grant: Option<Recipient>,
}

/// Resolves share tokens for a caller.
///
/// Checks run in a fixed order: existence, then expiry, then recipient
/// membership. An unknown token is never reported as forbidden.
#[derive(Debug, Clone)]
pub struct AccessGate {
    transfers: Arc<dyn TransferStore>,
}

impl AccessGate {
    /// Creates a new access gate.
    pub fn new(transfers: Arc<dyn TransferStore>) -> Self {
        Self { transfers }
    }

    /// Resolve `token` for `caller` as of `now`.
    pub async fn resolve(
        &self,
        token: &str,
        caller: Option<&Caller>,
        now: DateTime<Utc>,
    ) -> AppResult<ShareAccess> {
        let transfer = if TokenGenerator::is_well_formed(token) {
            self.transfers.find_by_token(token).await?
        } else {
            None
        }
        .ok_or_else(|| AppError::not_found("Invalid or expired share link"))?;

        if transfer.is_expired_at(now) {
            return Err(AppError::expired("This link has expired"));
        }

        if !transfer.requires_recipient() {
            return Ok(ShareAccess {
                transfer,
                grant: None,
            });
        }

        let caller = caller
            .ok_or_else(|| AppError::authentication("Sign in to open this transfer"))?;
        let grant = self
            .transfers
            .find_recipient(transfer.id, caller.user_id)
            .await?
            .ok_or_else(|| AppError::authorization("You are not a recipient of this transfer"))?;

        Ok(ShareAccess {
            transfer,
            grant: Some(grant),
        })
    }
}

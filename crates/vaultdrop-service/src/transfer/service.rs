//! Listing and revoking a user's transfers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::ObjectStore;
use vaultdrop_database::store::TransferStore;
use vaultdrop_entity::transfer::Transfer;

use crate::context::Caller;

/// Dashboard row for one transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSummary {
    /// Share token.
    pub token: String,
    /// Summed file size in bytes.
    pub total_size: i64,
    /// Number of files.
    pub file_count: usize,
    /// Number of recipient grants.
    pub recipient_count: i64,
    /// Whether the token alone grants access.
    pub is_anonymous: bool,
    /// Whether the transfer is past its expiry.
    pub expired: bool,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Lists and revokes transfers on behalf of their sender or recipients.
#[derive(Debug, Clone)]
pub struct TransferService {
    transfers: Arc<dyn TransferStore>,
    storage: Arc<dyn ObjectStore>,
}

impl TransferService {
    /// Creates a new transfer service.
    pub fn new(transfers: Arc<dyn TransferStore>, storage: Arc<dyn ObjectStore>) -> Self {
        Self { transfers, storage }
    }

    /// Transfers the caller has sent, newest first.
    pub async fn list_sent(&self, caller: &Caller) -> AppResult<Vec<TransferSummary>> {
        let transfers = self.transfers.list_by_sender(caller.user_id).await?;
        self.summarize(transfers).await
    }

    /// Unexpired transfers the caller is a recipient of, newest first.
    pub async fn list_received(&self, caller: &Caller) -> AppResult<Vec<TransferSummary>> {
        let transfers = self
            .transfers
            .list_for_recipient(caller.user_id, Utc::now())
            .await?;
        self.summarize(transfers).await
    }

    /// Withdraw a transfer before it expires. Only its sender may do this.
    ///
    /// The registry rows are soft-deleted first; stored objects are removed
    /// afterwards and failures there are only logged.
    pub async fn revoke(&self, caller: &Caller, token: &str) -> AppResult<()> {
        let transfer = self
            .transfers
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Invalid or expired share link"))?;

        if !transfer.is_sent_by(caller.user_id) {
            return Err(AppError::authorization("Only the sender can revoke a transfer"));
        }

        let files = self.transfers.list_files(transfer.id).await?;
        if !self.transfers.soft_delete(transfer.id).await? {
            return Err(AppError::not_found("Invalid or expired share link"));
        }

        for file in &files {
            if let Err(e) = self.storage.delete(&file.storage_key).await {
                warn!(
                    transfer_id = %transfer.id,
                    key = %file.storage_key,
                    error = %e,
                    "Failed to delete object of revoked transfer"
                );
            }
        }

        info!(
            transfer_id = %transfer.id,
            user_id = %caller.user_id,
            files = files.len(),
            "Transfer revoked"
        );
        Ok(())
    }

    async fn summarize(&self, transfers: Vec<Transfer>) -> AppResult<Vec<TransferSummary>> {
        let now = Utc::now();
        let mut summaries = Vec::with_capacity(transfers.len());
        for transfer in transfers {
            let file_count = self.transfers.list_files(transfer.id).await?.len();
            let recipient_count = self.transfers.count_recipients(transfer.id).await?;
            summaries.push(TransferSummary {
                expired: transfer.is_expired_at(now),
                token: transfer.token,
                total_size: transfer.total_size,
                file_count,
                recipient_count,
                is_anonymous: transfer.is_anonymous,
                expires_at: transfer.expires_at,
                created_at: transfer.created_at,
            });
        }
        Ok(summaries)
    }
}

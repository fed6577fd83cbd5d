//! Expired-transfer cleanup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::ObjectStore;
use vaultdrop_database::store::TransferStore;
use vaultdrop_entity::transfer::Transfer;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Transfers marked deleted.
    pub transfers_removed: usize,
    /// Objects deleted from storage.
    pub objects_deleted: usize,
    /// Objects that could not be deleted.
    pub object_failures: usize,
}

/// Deletes the objects of expired transfers, then soft-deletes the rows.
#[derive(Debug, Clone)]
pub struct ExpiredTransferCleanup {
    transfers: Arc<dyn TransferStore>,
    storage: Arc<dyn ObjectStore>,
    batch_size: i64,
}

impl ExpiredTransferCleanup {
    /// Create a new cleanup job
    pub fn new(
        transfers: Arc<dyn TransferStore>,
        storage: Arc<dyn ObjectStore>,
        batch_size: i64,
    ) -> Self {
        Self {
            transfers,
            storage,
            batch_size,
        }
    }

    /// Sweep transfers that expired before `now`.
    ///
    /// A failure on one transfer is logged and the sweep moves on.
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<CleanupReport> {
        let expired = self.transfers.find_expired(now, self.batch_size).await?;
        if expired.is_empty() {
            tracing::debug!("No expired transfers");
            return Ok(CleanupReport::default());
        }

        tracing::info!("Found {} expired transfers", expired.len());

        let mut report = CleanupReport::default();
        for transfer in &expired {
            if let Err(e) = self.clean(transfer, &mut report).await {
                tracing::error!(transfer_id = %transfer.id, "Failed to clean transfer: {}", e);
            }
        }

        tracing::info!(
            transfers = report.transfers_removed,
            objects = report.objects_deleted,
            failures = report.object_failures,
            "Cleanup sweep finished"
        );
        Ok(report)
    }

    async fn clean(&self, transfer: &Transfer, report: &mut CleanupReport) -> AppResult<()> {
        let files = self.transfers.list_files(transfer.id).await?;

        for file in &files {
            match self.storage.delete(&file.storage_key).await {
                Ok(()) => report.objects_deleted += 1,
                Err(e) => {
                    report.object_failures += 1;
                    tracing::warn!(
                        transfer_id = %transfer.id,
                        key = %file.storage_key,
                        "Failed to delete object: {}",
                        e
                    );
                }
            }
        }

        if self.transfers.soft_delete(transfer.id).await? {
            report.transfers_removed += 1;
        }
        Ok(())
    }
}

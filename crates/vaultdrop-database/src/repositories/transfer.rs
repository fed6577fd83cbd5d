//! Transfer repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use vaultdrop_core::error::{AppError, ErrorKind};
use vaultdrop_core::result::AppResult;
use vaultdrop_entity::file::{File, NewFile};
use vaultdrop_entity::recipient::{NewRecipient, Recipient};
use vaultdrop_entity::transfer::{NewTransfer, Transfer};

use super::map_write_error;
use crate::store::TransferStore;

/// Repository for transfers, their files, and recipient grants.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: PgPool,
}

impl TransferRepository {
    /// Create a new transfer repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_transfer(
        tx: &mut Transaction<'_, Postgres>,
        data: &NewTransfer,
    ) -> AppResult<Transfer> {
        sqlx::query_as::<_, Transfer>(
            "INSERT INTO transfers (id, token, total_size, is_anonymous, sender_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.token)
        .bind(data.total_size)
        .bind(data.is_anonymous)
        .bind(data.sender_id)
        .bind(data.expires_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create transfer"))
    }

    async fn insert_files(
        tx: &mut Transaction<'_, Postgres>,
        transfer_id: Uuid,
        files: &[NewFile],
    ) -> AppResult<()> {
        for file in files {
            sqlx::query(
                "INSERT INTO files (id, transfer_id, filename, size, storage_key, content_type, file_index) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::now_v7())
            .bind(transfer_id)
            .bind(&file.filename)
            .bind(file.size)
            .bind(&file.storage_key)
            .bind(&file.content_type)
            .bind(file.index)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "Failed to add transfer files"))?;
        }
        Ok(())
    }

    async fn insert_recipients(
        tx: &mut Transaction<'_, Postgres>,
        transfer_id: Uuid,
        recipients: &[NewRecipient],
    ) -> AppResult<()> {
        for recipient in recipients {
            sqlx::query(
                "INSERT INTO recipients (id, transfer_id, receiver_id, encrypted_key) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::now_v7())
            .bind(transfer_id)
            .bind(recipient.receiver_id)
            .bind(&recipient.encrypted_key)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_write_error(e, "Failed to grant recipient"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransferStore for TransferRepository {
    async fn commit(
        &self,
        transfer: NewTransfer,
        files: Vec<NewFile>,
        recipients: Vec<NewRecipient>,
    ) -> AppResult<Transfer> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        // An early return drops `tx`, which rolls everything back.
        let created = Self::insert_transfer(&mut tx, &transfer).await?;
        Self::insert_files(&mut tx, created.id, &files).await?;
        Self::insert_recipients(&mut tx, created.id, &recipients).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transfer", e)
        })?;

        debug!(
            transfer_id = %created.id,
            files = files.len(),
            recipients = recipients.len(),
            "Committed transfer"
        );
        Ok(created)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Transfer>> {
        sqlx::query_as::<_, Transfer>(
            "SELECT * FROM transfers WHERE token = $1 AND deleted = FALSE",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find transfer", e))
    }

    async fn list_files(&self, transfer_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE transfer_id = $1 AND deleted = FALSE ORDER BY file_index",
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn find_file(&self, transfer_id: Uuid, index: i32) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE transfer_id = $1 AND file_index = $2 AND deleted = FALSE",
        )
        .bind(transfer_id)
        .bind(index)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_recipient(
        &self,
        transfer_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<Option<Recipient>> {
        sqlx::query_as::<_, Recipient>(
            "SELECT * FROM recipients WHERE transfer_id = $1 AND receiver_id = $2",
        )
        .bind(transfer_id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find recipient", e))
    }

    async fn count_recipients(&self, transfer_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipients WHERE transfer_id = $1")
            .bind(transfer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count recipients", e)
            })
    }

    async fn list_by_sender(&self, sender_id: Uuid) -> AppResult<Vec<Transfer>> {
        sqlx::query_as::<_, Transfer>(
            "SELECT * FROM transfers WHERE sender_id = $1 AND deleted = FALSE \
             ORDER BY created_at DESC",
        )
        .bind(sender_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list sent transfers", e)
        })
    }

    async fn list_for_recipient(
        &self,
        receiver_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Transfer>> {
        sqlx::query_as::<_, Transfer>(
            "SELECT t.* FROM transfers t \
             JOIN recipients r ON r.transfer_id = t.id \
             WHERE r.receiver_id = $1 AND t.deleted = FALSE AND t.expires_at >= $2 \
             ORDER BY t.created_at DESC",
        )
        .bind(receiver_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list received transfers", e)
        })
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Transfer>> {
        sqlx::query_as::<_, Transfer>(
            "SELECT * FROM transfers WHERE deleted = FALSE AND expires_at < $1 \
             ORDER BY expires_at LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find expired transfers", e)
        })
    }

    async fn soft_delete(&self, transfer_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let updated = sqlx::query(
            "UPDATE transfers SET deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(transfer_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete transfer", e))?
        .rows_affected();

        sqlx::query(
            "UPDATE files SET deleted = TRUE, updated_at = NOW() \
             WHERE transfer_id = $1 AND deleted = FALSE",
        )
        .bind(transfer_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete files", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit deletion", e)
        })?;

        Ok(updated > 0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}

//! In-memory registry stores for single-process development and tests.
//!
//! Uniqueness rules mirror the database constraints so that conflict
//! handling behaves the same as against PostgreSQL.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_entity::file::{File, NewFile};
use vaultdrop_entity::recipient::{NewRecipient, Recipient};
use vaultdrop_entity::transfer::{NewTransfer, Transfer};
use vaultdrop_entity::user::{CreateUser, User};

use crate::store::{TransferStore, UserStore};

#[derive(Debug, Default)]
struct TransferState {
    transfers: HashMap<Uuid, Transfer>,
    files: HashMap<Uuid, Vec<File>>,
    recipients: HashMap<Uuid, Vec<Recipient>>,
}

/// In-memory [`TransferStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryTransferStore {
    state: Arc<Mutex<TransferState>>,
}

impl MemoryTransferStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transfer rows, including soft-deleted ones.
    pub async fn transfer_count(&self) -> usize {
        self.state.lock().await.transfers.len()
    }

    /// Number of file rows, including soft-deleted ones.
    pub async fn file_count(&self) -> usize {
        self.state.lock().await.files.values().map(Vec::len).sum()
    }

    /// Look up a transfer by token regardless of its deleted flag.
    pub async fn find_any_by_token(&self, token: &str) -> Option<Transfer> {
        self.state
            .lock()
            .await
            .transfers
            .values()
            .find(|t| t.token == token)
            .cloned()
    }
}

#[async_trait]
impl TransferStore for MemoryTransferStore {
    async fn commit(
        &self,
        transfer: NewTransfer,
        files: Vec<NewFile>,
        recipients: Vec<NewRecipient>,
    ) -> AppResult<Transfer> {
        let mut state = self.state.lock().await;

        // Validate everything before touching state so a failure leaves nothing behind.
        if state.transfers.values().any(|t| t.token == transfer.token) {
            return Err(AppError::conflict(
                "A transfer with this token has already been completed",
            ));
        }
        let mut indices = HashSet::new();
        if !files.iter().all(|f| indices.insert(f.index)) {
            return Err(AppError::conflict("Two files share the same index"));
        }
        let mut receivers = HashSet::new();
        if !recipients.iter().all(|r| receivers.insert(r.receiver_id)) {
            return Err(AppError::conflict("A recipient was listed more than once"));
        }

        let now = Utc::now();
        let created = Transfer {
            id: Uuid::now_v7(),
            token: transfer.token,
            total_size: transfer.total_size,
            is_anonymous: transfer.is_anonymous,
            sender_id: transfer.sender_id,
            expires_at: transfer.expires_at,
            deleted: false,
            created_at: now,
            updated_at: now,
        };

        let mut rows: Vec<File> = files
            .into_iter()
            .map(|f| File {
                id: Uuid::now_v7(),
                transfer_id: created.id,
                filename: f.filename,
                size: f.size,
                storage_key: f.storage_key,
                content_type: f.content_type,
                index: f.index,
                deleted: false,
                created_at: now,
                updated_at: now,
            })
            .collect();
        rows.sort_by_key(|f| f.index);

        let grants = recipients
            .into_iter()
            .map(|r| Recipient {
                id: Uuid::now_v7(),
                transfer_id: created.id,
                receiver_id: r.receiver_id,
                encrypted_key: r.encrypted_key,
                created_at: now,
            })
            .collect();

        state.files.insert(created.id, rows);
        state.recipients.insert(created.id, grants);
        state.transfers.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Transfer>> {
        let state = self.state.lock().await;
        Ok(state
            .transfers
            .values()
            .find(|t| t.token == token && !t.deleted)
            .cloned())
    }

    async fn list_files(&self, transfer_id: Uuid) -> AppResult<Vec<File>> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .get(&transfer_id)
            .map(|files| files.iter().filter(|f| !f.deleted).cloned().collect())
            .unwrap_or_default())
    }

    async fn find_file(&self, transfer_id: Uuid, index: i32) -> AppResult<Option<File>> {
        let state = self.state.lock().await;
        Ok(state
            .files
            .get(&transfer_id)
            .and_then(|files| files.iter().find(|f| f.index == index && !f.deleted))
            .cloned())
    }

    async fn find_recipient(
        &self,
        transfer_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<Option<Recipient>> {
        let state = self.state.lock().await;
        Ok(state
            .recipients
            .get(&transfer_id)
            .and_then(|grants| grants.iter().find(|r| r.receiver_id == receiver_id))
            .cloned())
    }

    async fn count_recipients(&self, transfer_id: Uuid) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .recipients
            .get(&transfer_id)
            .map(|grants| grants.len() as i64)
            .unwrap_or(0))
    }

    async fn list_by_sender(&self, sender_id: Uuid) -> AppResult<Vec<Transfer>> {
        let state = self.state.lock().await;
        let mut sent: Vec<Transfer> = state
            .transfers
            .values()
            .filter(|t| !t.deleted && t.sender_id == Some(sender_id))
            .cloned()
            .collect();
        sent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sent)
    }

    async fn list_for_recipient(
        &self,
        receiver_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Transfer>> {
        let state = self.state.lock().await;
        let mut received: Vec<Transfer> = state
            .recipients
            .iter()
            .filter(|(_, grants)| grants.iter().any(|r| r.receiver_id == receiver_id))
            .filter_map(|(id, _)| state.transfers.get(id))
            .filter(|t| !t.deleted && !t.is_expired_at(now))
            .cloned()
            .collect();
        received.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(received)
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Transfer>> {
        let state = self.state.lock().await;
        let mut expired: Vec<Transfer> = state
            .transfers
            .values()
            .filter(|t| !t.deleted && t.expires_at < now)
            .cloned()
            .collect();
        expired.sort_by_key(|t| t.expires_at);
        expired.truncate(limit.max(0) as usize);
        Ok(expired)
    }

    async fn soft_delete(&self, transfer_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        let updated = match state.transfers.get_mut(&transfer_id) {
            Some(t) if !t.deleted => {
                t.deleted = true;
                t.updated_at = now;
                true
            }
            _ => false,
        };

        if let Some(files) = state.files.get_mut(&transfer_id) {
            for file in files.iter_mut().filter(|f| !f.deleted) {
                file.deleted = true;
                file.updated_at = now;
            }
        }

        Ok(updated)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// In-memory [`UserStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let mut users = self.users.lock().await;

        if users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict("Username is already taken"));
        }
        if users.values().any(|u| u.email == data.email) {
            return Err(AppError::conflict("User already exists with this email"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            public_key: data.public_key,
            encrypted_private_key: data.encrypted_private_key,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

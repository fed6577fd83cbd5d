//! Registry traits consumed by the service layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use vaultdrop_core::result::AppResult;
use vaultdrop_entity::file::{File, NewFile};
use vaultdrop_entity::recipient::{NewRecipient, Recipient};
use vaultdrop_entity::transfer::{NewTransfer, Transfer};
use vaultdrop_entity::user::{CreateUser, User};

/// Durable ledger of transfers, their files, and recipient grants.
///
/// Every read excludes soft-deleted rows.
#[async_trait]
pub trait TransferStore: Send + Sync + std::fmt::Debug + 'static {
    /// Create a transfer together with its files and recipient grants.
    ///
    /// All rows become visible together or not at all. A duplicate token,
    /// file index, or receiver fails with a `Conflict` error.
    async fn commit(
        &self,
        transfer: NewTransfer,
        files: Vec<NewFile>,
        recipients: Vec<NewRecipient>,
    ) -> AppResult<Transfer>;

    /// Look up a live transfer by share token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Transfer>>;

    /// Files of a transfer ordered by index.
    async fn list_files(&self, transfer_id: Uuid) -> AppResult<Vec<File>>;

    /// One file of a transfer by index.
    async fn find_file(&self, transfer_id: Uuid, index: i32) -> AppResult<Option<File>>;

    /// The grant for `receiver_id` on `transfer_id`, if any.
    async fn find_recipient(
        &self,
        transfer_id: Uuid,
        receiver_id: Uuid,
    ) -> AppResult<Option<Recipient>>;

    /// Pure membership check on the recipient list.
    async fn is_authorized_recipient(&self, transfer_id: Uuid, receiver_id: Uuid) -> AppResult<bool> {
        Ok(self.find_recipient(transfer_id, receiver_id).await?.is_some())
    }

    /// Number of recipient grants on a transfer.
    async fn count_recipients(&self, transfer_id: Uuid) -> AppResult<i64>;

    /// Live transfers created by `sender_id`, newest first.
    async fn list_by_sender(&self, sender_id: Uuid) -> AppResult<Vec<Transfer>>;

    /// Unexpired live transfers granted to `receiver_id`, newest first.
    async fn list_for_recipient(
        &self,
        receiver_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Transfer>>;

    /// Live transfers whose expiry is before `now`, oldest expiry first.
    async fn find_expired(&self, now: DateTime<Utc>, limit: i64) -> AppResult<Vec<Transfer>>;

    /// Soft-delete a transfer and its files. Returns `false` if it was
    /// already deleted or never existed.
    async fn soft_delete(&self, transfer_id: Uuid) -> AppResult<bool>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Create a user. Duplicate username or email fails with `Conflict`.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

//! Share listing and download service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vaultdrop_core::config::StorageConfig;
use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::{ByteStream, ObjectStore};
use vaultdrop_database::store::{TransferStore, UserStore};
use vaultdrop_entity::file::File;

use super::access::{AccessGate, ShareAccess};
use crate::context::Caller;

/// One file as shown to a recipient. Storage keys are never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// Original filename.
    pub filename: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type.
    pub content_type: String,
    /// Position within the transfer.
    pub index: i32,
}

impl From<File> for SharedFile {
    fn from(file: File) -> Self {
        Self {
            filename: file.filename,
            size: file.size,
            content_type: file.content_type,
            index: file.index,
        }
    }
}

/// Public identity of the sender of a gated transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderInfo {
    /// Sender user ID.
    pub id: Uuid,
    /// Sender username.
    pub username: String,
    /// Sender public key, used by the recipient to verify the envelope.
    pub public_key: Option<String>,
}

/// Listing of a shared transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareListing {
    /// Share token.
    pub token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Whether the token alone grants access.
    pub is_anonymous: bool,
    /// Sender identity, for gated transfers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderInfo>,
    /// The caller's wrapped content key, for gated transfers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<String>,
    /// Files ordered by index.
    pub files: Vec<SharedFile>,
}

/// A short-lived download URL for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    /// Presigned GET URL.
    pub url: String,
    /// MIME type of the file.
    pub content_type: String,
    /// Original filename.
    pub filename: String,
    /// Seconds the URL stays valid.
    pub expires_in: u64,
}

/// A file body streamed through the server.
pub struct FileDownload {
    /// Original filename.
    pub filename: String,
    /// MIME type of the file.
    pub content_type: String,
    /// Size recorded at upload.
    pub size: i64,
    /// Object contents.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish()
    }
}

/// Resolves share tokens into listings and downloads.
#[derive(Debug, Clone)]
pub struct ShareService {
    transfers: Arc<dyn TransferStore>,
    users: Arc<dyn UserStore>,
    storage: Arc<dyn ObjectStore>,
    gate: AccessGate,
    download_ttl: Duration,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        transfers: Arc<dyn TransferStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn ObjectStore>,
        storage_config: &StorageConfig,
    ) -> Self {
        Self {
            gate: AccessGate::new(Arc::clone(&transfers)),
            transfers,
            users,
            storage,
            download_ttl: Duration::from_secs(storage_config.presign_ttl_seconds),
        }
    }

    /// List the files of a shared transfer.
    pub async fn list(&self, caller: Option<&Caller>, token: &str) -> AppResult<ShareListing> {
        let ShareAccess { transfer, grant } = self.gate.resolve(token, caller, Utc::now()).await?;

        let files = self
            .transfers
            .list_files(transfer.id)
            .await?
            .into_iter()
            .map(SharedFile::from)
            .collect();

        let sender = match (&grant, transfer.sender_id) {
            (Some(_), Some(sender_id)) => {
                self.users
                    .find_by_id(sender_id)
                    .await?
                    .map(|user| SenderInfo {
                        id: user.id,
                        username: user.username,
                        public_key: user.public_key,
                    })
            }
            _ => None,
        };

        Ok(ShareListing {
            token: transfer.token,
            expires_at: transfer.expires_at,
            is_anonymous: transfer.is_anonymous,
            sender,
            encrypted_key: grant.map(|g| g.encrypted_key),
            files,
        })
    }

    /// Issue a presigned GET URL for the file at `index`.
    pub async fn presign_download(
        &self,
        caller: Option<&Caller>,
        token: &str,
        index: i32,
    ) -> AppResult<DownloadLink> {
        let file = self.resolve_file(caller, token, index).await?;
        let url = self
            .storage
            .presign_get(&file.storage_key, self.download_ttl)
            .await?;

        info!(transfer_id = %file.transfer_id, index, "Issued download URL");

        Ok(DownloadLink {
            url,
            content_type: file.content_type,
            filename: file.filename,
            expires_in: self.download_ttl.as_secs(),
        })
    }

    /// Stream the file at `index` from storage.
    pub async fn stream_download(
        &self,
        caller: Option<&Caller>,
        token: &str,
        index: i32,
    ) -> AppResult<FileDownload> {
        let file = self.resolve_file(caller, token, index).await?;
        let stream = self.storage.read(&file.storage_key).await?;

        info!(transfer_id = %file.transfer_id, index, "Streaming download");

        Ok(FileDownload {
            filename: file.filename,
            content_type: file.content_type,
            size: file.size,
            stream,
        })
    }

    async fn resolve_file(
        &self,
        caller: Option<&Caller>,
        token: &str,
        index: i32,
    ) -> AppResult<File> {
        let access = self.gate.resolve(token, caller, Utc::now()).await?;
        self.transfers
            .find_file(access.transfer.id, index)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }
}

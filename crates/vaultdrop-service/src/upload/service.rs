//! Two-phase upload: presign, direct client upload, complete.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use vaultdrop_core::config::{StorageConfig, TransferConfig};
use vaultdrop_core::error::{AppError, ErrorKind};
use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::ObjectStore;
use vaultdrop_database::store::{TransferStore, UserStore};
use vaultdrop_entity::file::NewFile;
use vaultdrop_entity::recipient::NewRecipient;
use vaultdrop_entity::transfer::NewTransfer;

use super::validate;
use crate::context::Caller;
use crate::token::TokenGenerator;

/// A file announced before upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignFile {
    /// Original filename.
    pub filename: String,
    /// Declared size in bytes.
    pub size: u64,
}

/// A presigned PUT target for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    /// Filename as announced.
    pub filename: String,
    /// URL the client PUTs the bytes to.
    pub upload_url: String,
    /// Storage key to report back on completion.
    pub key: String,
}

/// Result of the presign phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignResponse {
    /// Transfer token the upload will be completed under.
    pub token: String,
    /// One upload target per announced file, in order.
    pub urls: Vec<PresignedUpload>,
    /// Lifetime of the upload URLs in seconds.
    pub expires_in: u64,
}

/// A file reported by the client after uploading it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedFile {
    /// Original filename.
    pub filename: String,
    /// Reported size in bytes.
    pub size: u64,
    /// Storage key returned by the presign phase.
    pub key: String,
    /// MIME type reported by the client.
    pub content_type: Option<String>,
    /// Explicit position; positional numbering applies when omitted.
    pub index: Option<i32>,
}

/// A recipient grant carried on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientGrant {
    /// The receiving user.
    pub receiver_id: Uuid,
    /// The content key wrapped with the receiver's public key.
    pub encrypted_key: String,
}

/// Input of the completion phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteUpload {
    /// Token issued by the presign phase.
    pub token: String,
    /// Files the client uploaded.
    pub files: Vec<CompletedFile>,
    /// Recipients allowed to open the transfer. Empty for an open link.
    #[serde(default)]
    pub recipients: Vec<RecipientGrant>,
}

/// Receipt for a committed transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Token to share with recipients.
    pub share_code: String,
    /// Seconds until the transfer expires.
    pub expires_in: u64,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Registry rows derived from a completion request.
#[derive(Debug)]
struct CompletionPlan {
    files: Vec<NewFile>,
    recipients: Vec<NewRecipient>,
    total: u64,
}

/// Orchestrates uploads: presign, existence check, atomic registration.
#[derive(Debug, Clone)]
pub struct UploadService {
    pub(super) transfers: Arc<dyn TransferStore>,
    pub(super) users: Arc<dyn UserStore>,
    pub(super) storage: Arc<dyn ObjectStore>,
    pub(super) tokens: TokenGenerator,
    pub(super) limits: TransferConfig,
    presign_ttl: Duration,
    verify_timeout: Duration,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        transfers: Arc<dyn TransferStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn ObjectStore>,
        limits: &TransferConfig,
        storage_config: &StorageConfig,
    ) -> Self {
        Self {
            transfers,
            users,
            storage,
            tokens: TokenGenerator::new(),
            limits: limits.clone(),
            presign_ttl: Duration::from_secs(storage_config.presign_ttl_seconds),
            verify_timeout: Duration::from_secs(storage_config.verify_timeout_seconds),
        }
    }

    /// Issue a token and one presigned PUT URL per announced file.
    ///
    /// Nothing is written to the registry.
    pub async fn presign(
        &self,
        caller: Option<&Caller>,
        files: Vec<PresignFile>,
    ) -> AppResult<PresignResponse> {
        self.check_file_count(files.len())?;
        for file in &files {
            validate::validate_filename(&file.filename)?;
        }
        validate::check_total(files.iter().map(|f| f.size), self.limits.max_total_size_bytes)?;

        let token = self.tokens.generate(self.limits.token_bytes)?;

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let key = validate::storage_key(&token, &file.filename);
            let upload_url = self.storage.presign_put(&key, self.presign_ttl).await?;
            urls.push(PresignedUpload {
                filename: file.filename,
                upload_url,
                key,
            });
        }

        info!(
            files = urls.len(),
            authenticated = caller.is_some(),
            "Issued presigned upload URLs"
        );

        Ok(PresignResponse {
            token,
            urls,
            expires_in: self.presign_ttl.as_secs(),
        })
    }

    /// Verify the uploaded objects and register the transfer.
    ///
    /// All input checks run before storage is touched. The transfer, its
    /// files, and its recipient grants become visible together or not at all.
    pub async fn complete(
        &self,
        caller: Option<&Caller>,
        request: CompleteUpload,
    ) -> AppResult<TransferReceipt> {
        let plan = self.plan_completion(caller, &request)?;
        self.check_receivers_exist(&plan.recipients).await?;
        self.verify_objects(&request.files).await?;

        self.commit(caller, request.token, plan.files, plan.recipients, plan.total)
            .await
    }

    fn plan_completion(
        &self,
        caller: Option<&Caller>,
        request: &CompleteUpload,
    ) -> AppResult<CompletionPlan> {
        validate::validate_token(&request.token)?;
        self.check_file_count(request.files.len())?;

        for file in &request.files {
            validate::validate_filename(&file.filename)?;
        }
        validate::validate_keys(&request.token, request.files.iter().map(|f| f.key.as_str()))?;

        let indices: Vec<Option<i32>> = request.files.iter().map(|f| f.index).collect();
        let indices = validate::resolve_indices(&indices)?;

        let total = validate::check_total(
            request.files.iter().map(|f| f.size),
            self.limits.max_total_size_bytes,
        )?;

        let recipients = self.validate_recipients(caller, &request.recipients)?;

        let files = request
            .files
            .iter()
            .zip(indices)
            .map(|(file, index)| NewFile {
                filename: file.filename.clone(),
                size: file.size as i64,
                storage_key: file.key.clone(),
                content_type: validate::normalize_content_type(file.content_type.as_deref()),
                index,
            })
            .collect();

        Ok(CompletionPlan {
            files,
            recipients,
            total,
        })
    }

    /// Check the recipient list against the caller and the anonymity policy.
    pub(super) fn validate_recipients(
        &self,
        caller: Option<&Caller>,
        grants: &[RecipientGrant],
    ) -> AppResult<Vec<NewRecipient>> {
        if grants.is_empty() {
            if self.limits.allow_anonymous {
                return Ok(Vec::new());
            }
            return match caller {
                None => Err(AppError::authentication("Sign in to send files")),
                Some(_) => Err(AppError::validation("At least one recipient is required")),
            };
        }

        if caller.is_none() {
            return Err(AppError::authentication(
                "Sign in to share files with recipients",
            ));
        }

        let mut seen = HashSet::new();
        let mut recipients = Vec::with_capacity(grants.len());
        for grant in grants {
            if !seen.insert(grant.receiver_id) {
                return Err(AppError::validation(format!(
                    "Recipient listed more than once: {}",
                    grant.receiver_id
                )));
            }
            if grant.encrypted_key.trim().is_empty() {
                return Err(AppError::validation(
                    "An encrypted key is required for every recipient",
                ));
            }
            recipients.push(NewRecipient {
                receiver_id: grant.receiver_id,
                encrypted_key: grant.encrypted_key.clone(),
            });
        }
        Ok(recipients)
    }

    async fn check_receivers_exist(&self, recipients: &[NewRecipient]) -> AppResult<()> {
        for recipient in recipients {
            if self.users.find_by_id(recipient.receiver_id).await?.is_none() {
                return Err(AppError::validation(format!(
                    "Unknown recipient: {}",
                    recipient.receiver_id
                )));
            }
        }
        Ok(())
    }

    /// Check every reported object concurrently. The first failure wins.
    async fn verify_objects(&self, files: &[CompletedFile]) -> AppResult<()> {
        let checks = files.iter().map(|file| async move {
            match self.storage.exists(&file.key).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(AppError::validation(format!(
                    "File not found: {}",
                    file.filename
                ))),
                Err(e) => Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to verify {}", file.filename),
                    e,
                )),
            }
        });

        tokio::time::timeout(self.verify_timeout, try_join_all(checks))
            .await
            .map_err(|_| AppError::service_unavailable("Timed out verifying uploaded files"))??;

        debug!(files = files.len(), "Verified uploaded objects");
        Ok(())
    }

    /// Write the transfer and its rows in one registry commit.
    pub(super) async fn commit(
        &self,
        caller: Option<&Caller>,
        token: String,
        files: Vec<NewFile>,
        recipients: Vec<NewRecipient>,
        total: u64,
    ) -> AppResult<TransferReceipt> {
        let is_anonymous = recipients.is_empty();
        let ttl_seconds = if is_anonymous {
            self.limits.anonymous_ttl_seconds
        } else {
            self.limits.authenticated_ttl_seconds
        };
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| AppError::configuration("Transfer lifetime is out of range"))?;

        let file_count = files.len();
        let recipient_count = recipients.len();

        let transfer = self
            .transfers
            .commit(
                NewTransfer {
                    token,
                    expires_at: Utc::now() + ttl,
                    total_size: total as i64,
                    is_anonymous,
                    sender_id: caller.map(|c| c.user_id),
                },
                files,
                recipients,
            )
            .await?;

        info!(
            transfer_id = %transfer.id,
            files = file_count,
            recipients = recipient_count,
            total_size = transfer.total_size,
            "Transfer completed"
        );

        Ok(TransferReceipt {
            share_code: transfer.token,
            expires_in: ttl_seconds,
            expires_at: transfer.expires_at,
        })
    }

    pub(super) fn check_file_count(&self, count: usize) -> AppResult<()> {
        if count == 0 {
            return Err(AppError::validation("No files provided"));
        }
        if count > self.limits.max_files {
            return Err(AppError::validation(format!(
                "A transfer holds at most {} files",
                self.limits.max_files
            )));
        }
        Ok(())
    }
}

//! Single-phase upload: bytes stream through the server into storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::StreamExt;
use tracing::{debug, warn};

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::ByteStream;
use vaultdrop_entity::file::NewFile;

use super::service::{TransferReceipt, UploadService};
use super::validate;
use crate::context::Caller;

/// An in-progress single-phase upload.
///
/// Objects are written as they arrive. Call [`DirectUpload::finish`] to
/// register them, or [`DirectUpload::abort`] to remove them again.
#[derive(Debug)]
pub struct DirectUpload {
    service: UploadService,
    token: String,
    files: Vec<NewFile>,
    written: Vec<String>,
    received: Arc<AtomicU64>,
}

impl UploadService {
    /// Start a single-phase upload for `caller`.
    pub fn begin_direct(&self, caller: Option<&Caller>) -> AppResult<DirectUpload> {
        self.validate_recipients(caller, &[])?;

        Ok(DirectUpload {
            service: self.clone(),
            token: self.tokens.generate(self.limits.token_bytes)?,
            files: Vec::new(),
            written: Vec::new(),
            received: Arc::new(AtomicU64::new(0)),
        })
    }
}

impl DirectUpload {
    /// Token the transfer will be registered under.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Bytes received so far across all files.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Stream one file into storage.
    ///
    /// The transfer-wide size cap is enforced while the bytes flow; crossing
    /// it fails with `PayloadTooLarge`.
    pub async fn add_file(
        &mut self,
        filename: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<u64> {
        validate::validate_filename(filename)?;
        if self.files.len() >= self.service.limits.max_files {
            return Err(AppError::validation(format!(
                "A transfer holds at most {} files",
                self.service.limits.max_files
            )));
        }

        let cap = self.service.limits.max_total_size_bytes;
        let received = Arc::clone(&self.received);
        let limited = stream.map(move |chunk| {
            let chunk = chunk?;
            let total = received.fetch_add(chunk.len() as u64, Ordering::Relaxed)
                + chunk.len() as u64;
            if total > cap {
                return Err(std::io::Error::other("upload size limit exceeded"));
            }
            Ok(chunk)
        });

        let key = validate::storage_key(&self.token, filename);
        self.written.push(key.clone());

        let size = match self.service.storage.write_stream(&key, Box::pin(limited)).await {
            Ok(size) => size,
            Err(_) if self.received() > cap => {
                return Err(AppError::payload_too_large(format!(
                    "Total upload size exceeds the limit of {cap} bytes"
                )));
            }
            Err(e) => return Err(e),
        };

        let index = i32::try_from(self.files.len())
            .map_err(|_| AppError::validation("Too many files"))?;
        self.files.push(NewFile {
            filename: filename.to_string(),
            size: size as i64,
            storage_key: key,
            content_type: validate::normalize_content_type(content_type),
            index,
        });

        debug!(index, bytes = size, "Stored direct upload part");
        Ok(size)
    }

    /// Register every stored file as one transfer.
    ///
    /// Stored objects are removed when registration fails.
    pub async fn finish(mut self, caller: Option<&Caller>) -> AppResult<TransferReceipt> {
        if self.files.is_empty() {
            self.abort().await;
            return Err(AppError::validation("No files provided"));
        }

        let files = std::mem::take(&mut self.files);
        let total = files.iter().map(|f| f.size as u64).sum();
        let result = self
            .service
            .commit(caller, self.token.clone(), files, Vec::new(), total)
            .await;

        if result.is_err() {
            self.abort().await;
        }
        result
    }

    /// Remove every object written so far.
    pub async fn abort(self) {
        for key in &self.written {
            if let Err(e) = self.service.storage.delete(key).await {
                warn!(key = %key, error = %e, "Failed to remove object of an abandoned upload");
            }
        }
    }
}

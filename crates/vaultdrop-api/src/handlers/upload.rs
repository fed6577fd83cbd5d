//! Upload handlers: presign, complete, and the legacy multipart upload.

use std::io;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use bytes::Bytes;
use futures::SinkExt;
use futures::channel::mpsc;

use vaultdrop_core::error::AppError;
use vaultdrop_core::result::AppResult;
use vaultdrop_service::upload::{
    CompleteUpload, DirectUpload, PresignFile, PresignResponse, TransferReceipt,
};

use crate::dto::request::{CompleteRequest, PresignFileRequest};
use crate::dto::response::ApiResponse;
use crate::extractors::{JsonBody, MaybeAuthUser, ValidJson};
use crate::state::AppState;

/// Chunks buffered between the multipart reader and the storage writer.
const PIPE_DEPTH: usize = 8;

/// POST /api/v1/files/presign
pub async fn presign(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    JsonBody(files): JsonBody<Vec<PresignFileRequest>>,
) -> Result<Json<ApiResponse<PresignResponse>>, AppError> {
    let files = files.into_iter().map(PresignFile::from).collect();
    let response = state.upload_service.presign(auth.caller(), files).await?;

    Ok(Json(ApiResponse::with_message(
        "Presigned URLs generated successfully",
        response,
    )))
}

/// POST /api/v1/files/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    ValidJson(req): ValidJson<CompleteRequest>,
) -> Result<Json<ApiResponse<TransferReceipt>>, AppError> {
    let receipt = state
        .upload_service
        .complete(auth.caller(), CompleteUpload::from(req))
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Files uploaded successfully",
        receipt,
    )))
}

/// POST /api/v1/files
///
/// Every file part is piped into storage as it arrives. Non-file parts are
/// ignored.
pub async fn upload_multipart(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<TransferReceipt>>, AppError> {
    let mut upload = state.upload_service.begin_direct(auth.caller())?;

    if let Err(e) = receive_files(&mut upload, &mut multipart).await {
        upload.abort().await;
        return Err(e);
    }

    let receipt = upload.finish(auth.caller()).await?;
    Ok(Json(ApiResponse::with_message(
        "Files uploaded successfully",
        receipt,
    )))
}

async fn receive_files(upload: &mut DirectUpload, multipart: &mut Multipart) -> AppResult<()> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        let (mut tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(PIPE_DEPTH);
        let pump = async move {
            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => {
                        // The writer hung up; it reports its own error.
                        if tx.send(Ok(chunk)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Ok(None) => return Ok(()),
                    Err(e) => {
                        let _ = tx.send(Err(io::Error::other(e.body_text()))).await;
                        return Err(multipart_error(e));
                    }
                }
            }
        };

        let (pumped, stored) = tokio::join!(
            pump,
            upload.add_file(&filename, content_type.as_deref(), Box::pin(rx))
        );
        pumped?;
        stored?;
    }
    Ok(())
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::payload_too_large("Request body is too large");
    }
    AppError::validation(format!("Multipart error: {}", e.body_text()))
}

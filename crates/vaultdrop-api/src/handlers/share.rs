//! Share handlers: listing and downloads by token.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use vaultdrop_core::error::AppError;
use vaultdrop_service::share::{DownloadLink, ShareListing};

use crate::dto::response::ApiResponse;
use crate::extractors::MaybeAuthUser;
use crate::extractors::path::parse_index;
use crate::state::AppState;

/// GET /api/v1/share/{token}
pub async fn list(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<ShareListing>>, AppError> {
    let listing = state.share_service.list(auth.caller(), &token).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// GET /api/v1/share/{token}/presign-download/{index}
pub async fn presign_download(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path((token, index)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DownloadLink>>, AppError> {
    let index = parse_index(&index)?;
    let link = state
        .share_service
        .presign_download(auth.caller(), &token, index)
        .await?;
    Ok(Json(ApiResponse::ok(link)))
}

/// GET /api/v1/share/{token}/download/{index}
pub async fn download(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path((token, index)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let index = parse_index(&index)?;
    let download = state
        .share_service
        .stream_download(auth.caller(), &token, index)
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", header_filename(&download.filename)),
        )
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// Filename safe to place inside a quoted header parameter.
fn header_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

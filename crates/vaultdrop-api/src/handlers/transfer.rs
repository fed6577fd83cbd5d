//! Transfer dashboard handlers.

use axum::Json;
use axum::extract::{Path, State};

use vaultdrop_core::error::AppError;
use vaultdrop_service::transfer::TransferSummary;

use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/transfers/sent
pub async fn sent(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<TransferSummary>>>, AppError> {
    let transfers = state.transfer_service.list_sent(&auth).await?;
    Ok(Json(ApiResponse::ok(transfers)))
}

/// GET /api/v1/transfers/received
pub async fn received(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<TransferSummary>>>, AppError> {
    let transfers = state.transfer_service.list_received(&auth).await?;
    Ok(Json(ApiResponse::ok(transfers)))
}

/// DELETE /api/v1/transfers/{token}
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.transfer_service.revoke(&auth, &token).await?;
    Ok(Json(ApiResponse::with_message("Transfer revoked", ())))
}

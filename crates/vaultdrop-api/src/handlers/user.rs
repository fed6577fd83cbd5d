//! User lookup handlers.

use axum::Json;
use axum::extract::{Path, State};

use vaultdrop_core::error::AppError;
use vaultdrop_service::user::PublicKeyInfo;

use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/{username}/public-key
pub async fn public_key(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<PublicKeyInfo>>, AppError> {
    let info = state.user_service.public_key(&username).await?;
    Ok(Json(ApiResponse::ok(info)))
}

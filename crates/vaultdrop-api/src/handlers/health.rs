//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match state.transfers.health_check().await {
        Ok(true) => true,
        Ok(false) => false,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };
    let storage = match state.object_store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(error = %e, provider = state.object_store.provider_type(), "Storage health check failed");
            false
        }
    };

    let healthy = database && storage;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database: if database { "connected" } else { "unavailable" }.to_string(),
            storage: if storage { "available" } else { "unavailable" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })),
    )
}

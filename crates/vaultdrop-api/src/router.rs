//! Route definitions for the VaultDrop HTTP API.
//!
//! All routes are organized by domain and mounted under `/api/v1`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(file_routes())
        .merge(share_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .merge(transfer_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Presign/complete protocol and the legacy multipart upload
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", post(handlers::upload::upload_multipart))
        .route("/files/presign", post(handlers::upload::presign))
        .route("/files/complete", post(handlers::upload::complete))
}

/// Token resolution and downloads
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/share/{token}", get(handlers::share::list))
        .route(
            "/share/{token}/presign-download/{index}",
            get(handlers::share::presign_download),
        )
        .route(
            "/share/{token}/download/{index}",
            get(handlers::share::download),
        )
}

/// Auth endpoints: sign-up, login, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(handlers::auth::sign_up))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// Public key lookup for recipient envelopes
fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/{username}/public-key",
        get(handlers::user::public_key),
    )
}

/// Sender and recipient dashboards
fn transfer_routes() -> Router<AppState> {
    Router::new()
        .route("/transfers/sent", get(handlers::transfer::sent))
        .route("/transfers/received", get(handlers::transfer::received))
        .route("/transfers/{token}", delete(handlers::transfer::revoke))
}

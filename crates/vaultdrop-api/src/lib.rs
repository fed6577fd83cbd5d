//! # vaultdrop-api
//!
//! HTTP API layer for VaultDrop built on Axum.
//!
//! Provides the REST endpoints under `/api/v1`, the session extractors,
//! CORS and request logging middleware, and the request/response DTOs.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

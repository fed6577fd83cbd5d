//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use vaultdrop_auth::jwt::{JwtDecoder, JwtEncoder};
use vaultdrop_auth::password::PasswordValidator;
use vaultdrop_core::config::AppConfig;
use vaultdrop_core::traits::storage::ObjectStore;
use vaultdrop_database::store::{TransferStore, UserStore};
use vaultdrop_service::{ShareService, TransferService, UploadService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Transfer registry
    pub transfers: Arc<dyn TransferStore>,
    /// Object storage gateway
    pub object_store: Arc<dyn ObjectStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Session token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Presign, complete and direct uploads
    pub upload_service: Arc<UploadService>,
    /// Share listing and downloads
    pub share_service: Arc<ShareService>,
    /// Sent/received dashboards and revocation
    pub transfer_service: Arc<TransferService>,
    /// Accounts and sessions
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wire every service from the injected stores.
    ///
    /// The stores and object store are constructed once by the caller and
    /// shared by all services.
    pub fn new(
        config: AppConfig,
        transfers: Arc<dyn TransferStore>,
        users: Arc<dyn UserStore>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        let upload_service = UploadService::new(
            Arc::clone(&transfers),
            Arc::clone(&users),
            Arc::clone(&object_store),
            &config.transfers,
            &config.storage,
        );
        let share_service = ShareService::new(
            Arc::clone(&transfers),
            Arc::clone(&users),
            Arc::clone(&object_store),
            &config.storage,
        );
        let transfer_service =
            TransferService::new(Arc::clone(&transfers), Arc::clone(&object_store));
        let user_service = UserService::new(
            users,
            PasswordValidator::new(&config.auth),
            JwtEncoder::new(&config.auth),
        );

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            config: Arc::new(config),
            transfers,
            object_store,
            upload_service: Arc::new(upload_service),
            share_service: Arc::new(share_service),
            transfer_service: Arc::new(transfer_service),
            user_service: Arc::new(user_service),
        }
    }
}

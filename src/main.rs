//! VaultDrop Server: temporary file transfers with optional recipient ACLs.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use vaultdrop_api::{AppState, build_router};
use vaultdrop_core::config::AppConfig;
use vaultdrop_core::error::AppError;
use vaultdrop_core::traits::storage::ObjectStore;
use vaultdrop_database::connection::DatabasePool;
use vaultdrop_database::store::{TransferStore, UserStore};
use vaultdrop_database::{TransferRepository, UserRepository};
use vaultdrop_worker::{CronScheduler, ExpiredTransferCleanup};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("VAULTDROP_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting VaultDrop v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        vaultdrop_database::migration::run_migrations(db.pool()).await?;
    } else {
        tracing::info!("Skipping database migrations");
    }

    // ── Step 2: Object storage ───────────────────────────────────
    let object_store = vaultdrop_storage::build_object_store(&config.storage).await?;
    if !object_store.supports_presign() {
        tracing::warn!(
            provider = object_store.provider_type(),
            "Storage provider cannot presign; only the multipart upload endpoint will work"
        );
    }
    match object_store.health_check().await {
        Ok(true) => tracing::info!(provider = object_store.provider_type(), "Storage reachable"),
        Ok(false) | Err(_) => tracing::warn!(
            provider = object_store.provider_type(),
            "Storage health check failed at startup"
        ),
    }

    // ── Step 3: Registry ─────────────────────────────────────────
    let transfers: Arc<dyn TransferStore> =
        Arc::new(TransferRepository::new(db.pool().clone()));
    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(db.pool().clone()));

    // ── Step 4: Cleanup scheduler ────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let cleanup = Arc::new(ExpiredTransferCleanup::new(
            Arc::clone(&transfers),
            Arc::clone(&object_store),
            config.worker.cleanup_batch_size,
        ));

        let scheduler = CronScheduler::new().await?;
        scheduler
            .register_cleanup(&config.worker.cleanup_cron, cleanup)
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Cleanup scheduler disabled");
        None
    };

    // ── Step 5: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, transfers, users, object_store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("VaultDrop server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    axum_serve(listener, app).await?;

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
    db.close().await;

    tracing::info!("VaultDrop server shut down gracefully");
    Ok(())
}

async fn axum_serve(listener: tokio::net::TcpListener, app: axum::Router) -> Result<(), AppError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use vaultdrop_core::error::{AppError, ErrorKind};

/// Apply the embedded migrations under `/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(
        available = migrator.iter().count(),
        "Applying database migrations"
    );

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to run migrations", e)
    })?;

    info!("Database schema is up to date");
    Ok(())
}

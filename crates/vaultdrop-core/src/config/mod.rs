//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so a partial file is valid.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod storage;
pub mod transfer;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::{LocalStorageConfig, S3StorageConfig, StorageConfig, StorageProviderKind};
pub use self::transfer::TransferConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Transfer limits and lifetimes.
    #[serde(default)]
    pub transfers: TransferConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `VAULTDROP__`, for example
    /// `VAULTDROP__STORAGE__S3__BUCKET`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VAULTDROP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.transfers.max_total_size_bytes == 0 {
            return Err(AppError::configuration(
                "transfers.max_total_size_bytes must be greater than zero",
            ));
        }
        if self.transfers.max_total_size_bytes > i64::MAX as u64 {
            return Err(AppError::configuration(format!(
                "transfers.max_total_size_bytes must not exceed {}",
                i64::MAX
            )));
        }
        if self.transfers.max_files == 0 {
            return Err(AppError::configuration(
                "transfers.max_files must be greater than zero",
            ));
        }
        if self.transfers.token_bytes < 16 {
            return Err(AppError::configuration(
                "transfers.token_bytes must be at least 16",
            ));
        }
        if self.transfers.anonymous_ttl_seconds == 0 || self.transfers.authenticated_ttl_seconds == 0
        {
            return Err(AppError::configuration(
                "transfer lifetimes must be greater than zero",
            ));
        }
        if self.storage.presign_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "storage.presign_ttl_seconds must be greater than zero",
            ));
        }
        if self.storage.provider == StorageProviderKind::S3 && self.storage.s3.bucket.is_empty() {
            return Err(AppError::configuration(
                "storage.s3.bucket is required when the s3 provider is selected",
            ));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.transfers.max_total_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.transfers.anonymous_ttl_seconds, 3600);
        assert_eq!(config.storage.presign_ttl_seconds, 900);
    }

    #[test]
    fn test_s3_requires_bucket() {
        let mut config = AppConfig::default();
        config.storage.provider = StorageProviderKind::S3;
        assert!(config.validate().is_err());

        config.storage.s3.bucket = "transfers".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let mut config = AppConfig::default();
        config.transfers.max_total_size_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cap_must_fit_signed_sizes() {
        let mut config = AppConfig::default();
        config.transfers.max_total_size_bytes = i64::MAX as u64;
        assert!(config.validate().is_ok());

        config.transfers.max_total_size_bytes = i64::MAX as u64 + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_files_rejected() {
        let mut config = AppConfig::default();
        config.transfers.max_files = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.message, "transfers.max_files must be greater than zero");
    }
}

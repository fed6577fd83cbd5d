//! # vaultdrop-storage
//!
//! Object storage providers for VaultDrop. S3-compatible stores serve the
//! presigned two-phase upload flow; the local filesystem provider serves
//! the single-phase upload path; the memory provider backs tests.

pub mod providers;

use std::sync::Arc;

use tracing::info;

use vaultdrop_core::config::{StorageConfig, StorageProviderKind};
use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::ObjectStore;

pub use providers::local::LocalStorageProvider;
pub use providers::memory::MemoryObjectStore;
#[cfg(feature = "s3")]
pub use providers::s3::S3StorageProvider;

/// Construct the configured object store.
pub async fn build_object_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.provider {
        StorageProviderKind::S3 => build_s3(config).await?,
        StorageProviderKind::Local => {
            Arc::new(LocalStorageProvider::new(&config.local.root_path).await?)
        }
        StorageProviderKind::Memory => Arc::new(MemoryObjectStore::new()),
    };

    info!(provider = store.provider_type(), "Object store initialized");
    Ok(store)
}

#[cfg(feature = "s3")]
async fn build_s3(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    Ok(Arc::new(S3StorageProvider::new(&config.s3).await))
}

#[cfg(not(feature = "s3"))]
async fn build_s3(_config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    Err(vaultdrop_core::AppError::configuration(
        "vaultdrop-storage was built without the `s3` feature",
    ))
}

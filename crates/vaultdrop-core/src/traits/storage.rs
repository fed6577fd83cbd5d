//! Object storage gateway trait.
//!
//! The upload orchestrator and share resolver only ever talk to storage
//! through [`ObjectStore`]. Keys are opaque strings chosen by the caller.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object storage backends.
///
/// Implementations live in `vaultdrop-storage` (S3-compatible, local
/// filesystem, in-memory).
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "local").
    fn provider_type(&self) -> &str;

    /// Whether this backend can issue presigned URLs.
    fn supports_presign(&self) -> bool {
        true
    }

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Issue a time-limited URL allowing a single PUT of `key`.
    async fn presign_put(&self, key: &str, ttl: Duration) -> AppResult<String>;

    /// Issue a time-limited URL allowing a GET of `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<String>;

    /// Check whether an object exists at `key`.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Write a byte stream to `key`, returning the number of bytes stored.
    async fn write_stream(&self, key: &str, stream: ByteStream) -> AppResult<u64>;

    /// Read the object at `key` as a byte stream.
    async fn read(&self, key: &str) -> AppResult<ByteStream>;

    /// Delete the object at `key`. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

//! In-memory object store used by tests and local development.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio::sync::Mutex;

use vaultdrop_core::error::{AppError, ErrorKind};
use vaultdrop_core::result::AppResult;
use vaultdrop_core::traits::storage::{ByteStream, ObjectStore};

#[derive(Debug, Default)]
struct MemoryState {
    objects: HashMap<String, Bytes>,
    failing: HashSet<String>,
}

/// Object store holding everything in a shared map.
///
/// Presigned URLs use a `memory://` scheme; nothing dereferences them, so
/// tests place objects directly with [`MemoryObjectStore::put`].
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an object as if a client had completed a presigned PUT.
    pub async fn put(&self, key: &str, data: impl Into<Bytes>) {
        self.state
            .lock()
            .await
            .objects
            .insert(key.to_string(), data.into());
    }

    /// Make every operation on `key` fail with a storage error.
    pub async fn fail_on(&self, key: &str) {
        self.state.lock().await.failing.insert(key.to_string());
    }

    /// Whether an object is currently stored at `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.state.lock().await.objects.contains_key(key)
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.state.lock().await.objects.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check(state: &MemoryState, key: &str) -> AppResult<()> {
        if state.failing.contains(key) {
            return Err(AppError::new(
                ErrorKind::Storage,
                format!("Storage backend failure for {key}"),
            ));
        }
        Ok(())
    }

    fn presigned(key: &str, method: &str, ttl: Duration) -> String {
        format!("memory://{key}?method={method}&expires={}", ttl.as_secs())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn presign_put(&self, key: &str, ttl: Duration) -> AppResult<String> {
        Self::check(&*self.state.lock().await, key)?;
        Ok(Self::presigned(key, "PUT", ttl))
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> AppResult<String> {
        Self::check(&*self.state.lock().await, key)?;
        Ok(Self::presigned(key, "GET", ttl))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Self::check(&state, key)?;
        Ok(state.objects.contains_key(key))
    }

    async fn write_stream(&self, key: &str, mut stream: ByteStream) -> AppResult<u64> {
        Self::check(&*self.state.lock().await, key)?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Stream read error", e))?;
            buffer.extend_from_slice(&chunk);
        }

        let size = buffer.len() as u64;
        self.state
            .lock()
            .await
            .objects
            .insert(key.to_string(), buffer.freeze());
        Ok(size)
    }

    async fn read(&self, key: &str) -> AppResult<ByteStream> {
        let state = self.state.lock().await;
        Self::check(&state, key)?;
        let data = state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        Self::check(&state, key)?;
        state.objects.remove(key);
        Ok(())
    }
}

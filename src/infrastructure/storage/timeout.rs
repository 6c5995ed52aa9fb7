use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::application::ports::object_store::ObjectStore;

/// Bounds every call on the wrapped store by a fixed timeout.
pub struct TimeoutObjectStore<S> {
    inner: S,
    limit: Duration,
}

impl<S: ObjectStore> TimeoutObjectStore<S> {
    pub fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStore for TimeoutObjectStore<S> {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> anyhow::Result<String> {
        tokio::time::timeout(self.limit, self.inner.put(path, bytes, content_type))
            .await
            .map_err(|_| anyhow!("storage put timed out after {:?}: {path}", self.limit))?
    }

    async fn delete(&self, path: &str) -> anyhow::Result<bool> {
        tokio::time::timeout(self.limit, self.inner.delete(path))
            .await
            .map_err(|_| anyhow!("storage delete timed out after {:?}: {path}", self.limit))?
    }

    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        tokio::time::timeout(self.limit, self.inner.get(path))
            .await
            .map_err(|_| anyhow!("storage get timed out after {:?}: {path}", self.limit))?
    }
}

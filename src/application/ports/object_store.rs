use async_trait::async_trait;

/// Durable blob store keyed by an opaque path.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes `bytes` under `path` and returns the key actually used.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> anyhow::Result<String>;
    /// Returns `false` when the key did not exist. Missing keys are not an error.
    async fn delete(&self, path: &str) -> anyhow::Result<bool>;
    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

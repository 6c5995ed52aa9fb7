use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use crate::application::ports::object_store::ObjectStore;

use super::normalize_key;

/// Stores objects as plain files below `root`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> anyhow::Result<(String, PathBuf)> {
        let key = normalize_key(path)?;
        let full = self.root.join(&key);
        Ok((key, full))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> anyhow::Result<String> {
        let (key, full) = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory for {key}"))?;
        }
        tokio::fs::write(&full, bytes)
            .await
            .with_context(|| format!("failed to write {key}"))?;
        Ok(key)
    }

    async fn delete(&self, path: &str) -> anyhow::Result<bool> {
        let (key, full) = self.full_path(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err).with_context(|| format!("failed to delete {key}")),
        }
    }

    async fn get(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let (key, full) = self.full_path(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed to read {key}")),
        }
    }
}

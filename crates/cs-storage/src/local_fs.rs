//! Local filesystem store — one plain-text file per key under a root directory.

use crate::traits::{check_key, ArtifactStore};
use async_trait::async_trait;
use cs_core::{CodeslimError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct LocalFsStore {
    root: PathBuf,
}

impl LocalFsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_to_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ArtifactStore for LocalFsStore {
    async fn put(&self, key: &str, content: &str) -> Result<String> {
        check_key(key)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CodeslimError::Storage(format!("mkdir {}: {e}", self.root.display())))?;
        let path = self.key_to_path(key);
        fs::write(&path, content)
            .await
            .map_err(|e| CodeslimError::Storage(format!("write {key}: {e}")))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(path.to_string_lossy().to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        match fs::read_to_string(self.key_to_path(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CodeslimError::Storage(format!("read {key}: {e}"))),
        }
    }

    async fn exists(&self, key: &str) -> bool {
        check_key(key).is_ok() && fs::try_exists(self.key_to_path(key)).await.unwrap_or(false)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;
        fs::remove_file(self.key_to_path(key))
            .await
            .map_err(|e| CodeslimError::Storage(format!("rm {key}: {e}")))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut rd = match fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
            Err(e) => return Err(CodeslimError::Storage(format!("ls: {e}"))),
        };
        while let Some(entry) = rd
            .next_entry()
            .await
            .map_err(|e| CodeslimError::Storage(format!("ls entry: {e}")))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                keys.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

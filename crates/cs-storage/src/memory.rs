//! In-memory store, for tests and callers that only want the texts back.

use crate::traits::{check_key, ArtifactStore};
use async_trait::async_trait;
use cs_core::{CodeslimError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(&self, key: &str, content: &str) -> Result<String> {
        check_key(key)?;
        self.entries.write().insert(key.to_string(), content.to_string());
        Ok(format!("memory://{key}"))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        check_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn exists(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        check_key(key)?;
        self.entries
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CodeslimError::Storage(format!("rm {key}: not found")))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

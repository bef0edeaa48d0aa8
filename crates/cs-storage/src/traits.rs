use async_trait::async_trait;
use cs_core::Result;

/// Key/value sink for artifact texts. Keys are flat names such as
/// `mymod_mr.py`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `content` under `key`, replacing any previous value.
    /// Returns a locator for the stored value (a path for file stores).
    async fn put(&self, key: &str, content: &str) -> Result<String>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn exists(&self, key: &str) -> bool;

    async fn delete(&self, key: &str) -> Result<()>;

    /// All keys, sorted.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Reject keys that could escape the store root.
pub(crate) fn check_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if bad {
        return Err(cs_core::CodeslimError::Storage(format!("invalid key: {key:?}")));
    }
    Ok(())
}

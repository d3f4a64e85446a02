//! Persistent key-value storage for the encrypted vault record.
//!
//! The vault only ever writes ciphertext through this seam. Two adapters:
//! - [`MemoryStore`]: process-local map, for tests and ephemeral vaults
//! - [`FileStore`]: one JSON file per key, written atomically

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::VaultError;

/// Async key-value store holding serialized records.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Fetch the value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Replace the value under `key` in one step.
    async fn put(&self, key: &str, value: String) -> Result<(), VaultError>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Map-backed store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let values = self
            .values
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), VaultError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".into()))?;
        values.insert(key.to_owned(), value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Directory-backed store: `{dir}/{key}.json`, owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory must already exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, VaultError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(VaultError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<(), VaultError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        tokio::fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|e| VaultError::Storage(format!("failed to write {}: {e}", tmp.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| VaultError::Storage(format!("failed to set permissions: {e}")))?;
        }

        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| VaultError::Storage(format!("failed to replace {}: {e}", path.display())))?;

        debug!(key, bytes = value.len(), "record persisted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn memory_store_get_put() {
        let store = MemoryStore::new();
        assert!(store.get("vaultData").await.unwrap().is_none());
        store.put("vaultData", "one".into()).await.unwrap();
        store.put("vaultData", "two".into()).await.unwrap();
        assert_eq!(store.get("vaultData").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("vaultData").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_roundtrip_and_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.put("vaultData", "{\"a\":1}".into()).await.unwrap();
        store.put("vaultData", "{\"a\":2}".into()).await.unwrap();
        assert_eq!(
            store.get("vaultData").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(!dir.path().join(".vaultData.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        for key in ["", "../escape", "a/b", "dot.json"] {
            assert!(matches!(
                store.put(key, "x".into()).await,
                Err(VaultError::Storage(_))
            ));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_store_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.put("vaultData", "x".into()).await.unwrap();
        let mode = std::fs::metadata(dir.path().join("vaultData.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

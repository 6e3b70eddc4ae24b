//! Key/value stores backing persisted client state

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

use crate::StorageError;

/// Store file name inside the data directory
const STORE_FILE: &str = "local_storage.json";

/// Flat string key/value storage.
///
/// Values are read fresh on every call; nothing above this trait caches them.
/// There is no atomicity across keys.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Returns whether it was present.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// In-memory store, lost when dropped
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Ok(entries.remove(key).is_some())
    }
}

/// File-backed store, rewritten in full on every change
pub struct FileStore {
    entries: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
}

impl FileStore {
    /// Load the store from `dir` or start empty.
    ///
    /// A corrupt file is treated as empty; the next write replaces it.
    pub fn load(dir: &Path) -> Result<Self, StorageError> {
        let file_path = dir.join(STORE_FILE);

        let entries = if file_path.exists() {
            let content = std::fs::read_to_string(&file_path)
                .map_err(|e| StorageError::Read(format!("{}: {}", file_path.display(), e)))?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Discarding unreadable store {}: {}", file_path.display(), e);
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            file_path,
        })
    }

    /// Load the store from the default data directory
    pub fn load_default() -> Result<Self, StorageError> {
        Self::load(&worksite_paths::data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Write(format!("failed to create data dir: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Write(format!("failed to serialize store: {}", e)))?;

        std::fs::write(&self.file_path, content)
            .map_err(|e| StorageError::Write(format!("{}: {}", self.file_path.display(), e)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set("admin_portal_token", "abc").unwrap();
        assert_eq!(store.get("admin_portal_token").as_deref(), Some("abc"));
        assert_eq!(store.len(), 1);

        assert!(store.remove("admin_portal_token").unwrap());
        assert!(!store.remove("admin_portal_token").unwrap());
        assert!(store.get("admin_portal_token").is_none());
    }

    #[test]
    fn file_store_starts_empty() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::load(temp_dir.path()).unwrap();
        assert!(store.get("anything").is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_persists_across_loads() {
        let temp_dir = tempdir().unwrap();

        {
            let store = FileStore::load(temp_dir.path()).unwrap();
            store.set("admin_portal_selected_site", "s1").unwrap();
        }

        let store = FileStore::load(temp_dir.path()).unwrap();
        assert_eq!(store.get("admin_portal_selected_site").as_deref(), Some("s1"));
    }

    #[test]
    fn file_store_remove_is_persisted() {
        let temp_dir = tempdir().unwrap();

        {
            let store = FileStore::load(temp_dir.path()).unwrap();
            store.set("k", "v").unwrap();
            assert!(store.remove("k").unwrap());
        }

        let store = FileStore::load(temp_dir.path()).unwrap();
        assert!(store.get("k").is_none());
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let nested = temp_dir.path().join("nested").join("deep");

        let store = FileStore::load(&nested).unwrap();
        store.set("k", "v").unwrap();

        assert!(nested.join(STORE_FILE).exists());
    }

    #[test]
    fn file_store_tolerates_corrupt_file() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join(STORE_FILE), "{not json").unwrap();

        let store = FileStore::load(temp_dir.path()).unwrap();
        assert!(store.get("k").is_none());

        store.set("k", "v").unwrap();
        let reloaded = FileStore::load(temp_dir.path()).unwrap();
        assert_eq!(reloaded.get("k").as_deref(), Some("v"));
    }
}

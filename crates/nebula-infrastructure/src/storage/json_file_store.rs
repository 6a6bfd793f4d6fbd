//! Key-value store persisted as a single JSON object on disk.

use nebula_core::storage::KeyValueStore;
use nebula_core::{ArcadeError, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A [`KeyValueStore`] that keeps every item in one JSON file.
///
/// The file is read once on open and rewritten on every mutation.
///
/// Provides:
/// - **Atomicity**: writes go to a tmp file that is renamed over the original
/// - **Durability**: explicit fsync before rename
/// - **Isolation**: a process-local mutex serializes writers
///
/// Does NOT:
/// - Coordinate with other processes writing the same file
/// - Interpret stored values (they are opaque strings)
pub struct JsonFileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(JsonFileStore)`: file loaded, or absent/empty and treated as empty
    /// - `Err(ArcadeError::Storage)`: file exists but could not be read
    /// - `Err(ArcadeError::Serialization)`: file is not a JSON string map
    pub fn open(path: PathBuf) -> Result<Self> {
        let items = Self::load(&path)?;
        tracing::debug!(path = %path.display(), keys = items.len(), "Opened key-value store");
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(items)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| ArcadeError::storage("Store path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ArcadeError::storage("Store path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }

    fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        // Changes become visible only once they are on disk
        let mut next = items.clone();
        if f(&mut next) {
            self.persist(&next).inspect_err(|err| {
                tracing::error!(path = %self.path.display(), error = %err, "Failed to persist key-value store");
            })?;
            *items = next;
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|items| {
            let previous = items.insert(key.to_string(), value.to_string());
            previous.as_deref() != Some(value)
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.mutate(|items| items.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("storage.json")).unwrap();
        assert_eq!(store.get_item("anything"), None);
        // Nothing is written until the first mutation
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("storage.json");

        let store = JsonFileStore::open(path.clone()).unwrap();
        store.set_item("nebula.history.cipher", r#"["APPLE"]"#).unwrap();
        store.set_item("nebula.credential", "key-1").unwrap();
        store.remove_item("nebula.credential").unwrap();
        drop(store);

        let reopened = JsonFileStore::open(path).unwrap();
        assert_eq!(
            reopened.get_item("nebula.history.cipher").as_deref(),
            Some(r#"["APPLE"]"#)
        );
        assert_eq!(reopened.get_item("nebula.credential"), None);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();

        let result = JsonFileStore::open(path);
        assert!(matches!(result, Err(ArcadeError::Serialization { .. })));
    }

    #[test]
    fn test_failed_write_leaves_items_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let store = JsonFileStore::open(blocker.join("storage.json")).unwrap();

        assert!(store.set_item("nebula.credential", "key-1").is_err());
        assert_eq!(store.get_item("nebula.credential"), None);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        let store = JsonFileStore::open(path).unwrap();
        store.set_item("k", "v").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

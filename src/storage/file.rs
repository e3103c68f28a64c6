//! File-backed blob store
//!
//! One pretty-printed JSON file per key under a root directory. Keys are
//! sanitized to a safe filename character set before touching the
//! filesystem, so a hostile key can never escape the root.

use super::BlobStore;
use crate::types::EconomyError;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Blob store that keeps each key as `<root>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `root`
    ///
    /// The directory is created lazily on first save, so constructing a
    /// store never fails.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", safe))
    }

    /// Root directory this store writes under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, EconomyError> {
        let path = self.key_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), EconomyError> {
        fs::create_dir_all(&self.root)?;
        let path = self.key_path(key);
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(&path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.load("player_ledger").unwrap(), None);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let blob = json!({"alice": {"balance": 4.5}});

        store.save("player_ledger", &blob).unwrap();
        assert_eq!(store.load("player_ledger").unwrap(), Some(blob));
    }

    #[test]
    fn test_keys_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.save("../escape/attempt", &json!(1)).unwrap();

        // The blob landed inside the root under a sanitized name
        assert!(dir.path().join(".._escape_attempt.json").exists());
        assert_eq!(store.load("../escape/attempt").unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_corrupt_blob_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let result = store.load("broken");
        assert!(matches!(
            result.unwrap_err(),
            EconomyError::StorageUnavailable { .. }
        ));
    }

    #[test]
    fn test_save_creates_root_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("persist").join("blobs");
        let store = FileStore::new(&nested);

        store.save("sells_by_day", &json!({})).unwrap();
        assert!(nested.join("sells_by_day.json").exists());
    }
}

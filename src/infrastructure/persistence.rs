//! Durable key-value storage for intermediate form state.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::error::StoreError;

/// String key to JSON blob storage. Last write wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Store backed by a single JSON object file.
///
/// Each key maps to the JSON text of one form. The whole file is replaced on
/// every `set` through a temp file + rename, so a crash never leaves it half written.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid store file format, starting empty");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read store file, starting empty");
                Map::new()
            }
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened form state store");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(Value::to_string)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let parsed: Value = serde_json::from_str(&value)?;
        self.entries.insert(key.to_string(), parsed);
        let json = serde_json::to_string_pretty(&self.entries)?;
        atomic_write(&self.path, &json)
    }
}

fn atomic_write(target_path: &Path, content: &str) -> Result<(), StoreError> {
    // The temp file must live next to the target for the rename to be atomic
    let target_dir = target_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(target_dir)?;

    let mut temp_file = NamedTempFile::new_in(target_dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(target_path).map_err(|e| e.error)?;
    Ok(())
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Typed access to form blobs in a [`KeyValueStore`].
pub struct FormCache;

impl FormCache {
    pub fn save<T: Serialize>(
        store: &mut dyn KeyValueStore,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        store.set(key, json)
    }

    /// Loads the blob under `key`. Absent or malformed blobs yield `None`.
    pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
        let raw = store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed persisted form state");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LoanParameters, PersonalData};
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_last_write_wins() {
        let mut store = MemoryStore::default();
        assert!(store.get("k").is_none());
        store.set("k", "1".to_string()).unwrap();
        store.set("k", "2".to_string()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut store = FileStore::open(&path);
        let params = LoanParameters { loan_amount: 700, loan_term: 15 };
        FormCache::save(&mut store, "loanParameters", &params).unwrap();

        let reopened = FileStore::open(&path);
        let loaded: Option<LoanParameters> = FormCache::load(&reopened, "loanParameters");
        assert_eq!(loaded, Some(params));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = FileStore::open(&path);
        store.set("a", r#"{"x":1}"#.to_string()).unwrap();
        store.set("b", r#"{"y":2}"#.to_string()).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("a").as_deref(), Some(r#"{"x":1}"#));
        assert_eq!(reopened.get("b").as_deref(), Some(r#"{"y":2}"#));
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut store = FileStore::open(&path);
        for n in 0..5 {
            store.set("loanParameters", format!(r#"{{"loanAmount":{}}}"#, 200 + n * 100)).unwrap();
        }

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("state.json")]);

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Map<String, Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["loanParameters"]["loanAmount"], 600);
    }

    #[test]
    fn test_file_store_rejects_non_json_value() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("state.json"));
        assert!(matches!(store.set("a", "not json".to_string()), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ definitely not json").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get("personalData").is_none());
    }

    #[test]
    fn test_malformed_blob_loads_as_none() {
        let mut store = MemoryStore::default();
        store.set("personalData", "[1, 2, 3]".to_string()).unwrap();
        let loaded: Option<PersonalData> = FormCache::load(&store, "personalData");
        assert!(loaded.is_none());
    }
}

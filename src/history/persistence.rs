//! Durable keyed records.
//!
//! A record is a string value under a fixed key. [`JsonFileStore`] keeps one file per
//! key in the data directory and replaces it atomically (temp file + rename), so a
//! crash mid-write leaves either the old or the new record, never a torn one.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::StorageError;

pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per record under `dir`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key).map_err(|e| StorageError::Io(self.dir.join(key), e))?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Io(self.dir.clone(), e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        self.ensure_dir()?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(|e| StorageError::Io(tmp_path.clone(), e))?;
        fs::rename(&tmp_path, &path).map_err(|e| StorageError::Io(path.clone(), e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }
}

/// Keys become file names, so keep them to a safe alphabet
fn validate_key(key: &str) -> io::Result<()> {
    let valid = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid record key '{}'", key)))
    }
}

/// Process-local store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.records().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records().remove(key);
        Ok(())
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::persistence::KeyValueStore;
use crate::error::StorageError;
use crate::models::HistoryEntry;

/// Maximum number of entries kept; older ones are evicted on save
pub const HISTORY_CAPACITY: usize = 50;

/// Key of the persisted record holding the whole collection
pub const HISTORY_KEY: &str = "qrforge-history";

/// Newest-first, deduplicated, size-capped log of saved configurations.
///
/// The whole collection lives in one record as a JSON array. Each operation is a
/// read-modify-write of that record, serialized by an internal lock. A missing or
/// unparseable record reads as an empty history. A record that cannot be read at
/// all fails `save` and `delete` instead, so it is never overwritten blind.
pub struct HistoryStore {
    backend: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend, write_lock: Mutex::new(()) }
    }

    /// Insert `entry` at the front, replacing any entry with the same id, then cap at
    /// [`HISTORY_CAPACITY`].
    pub fn save(&self, entry: HistoryEntry) -> Result<(), StorageError> {
        let _guard = self.lock();
        let mut entries = self.try_load()?;

        let before = entries.len();
        entries.retain(|existing| existing.id != entry.id);
        let replaced = entries.len() != before;

        let id = entry.id.clone();
        entries.insert(0, entry);
        let evicted = entries.len().saturating_sub(HISTORY_CAPACITY);
        entries.truncate(HISTORY_CAPACITY);

        self.store(&entries)?;
        info!(id = %id, replaced, evicted, total = entries.len(), "saved history entry");
        Ok(())
    }

    /// All entries, newest first
    pub fn list(&self) -> Vec<HistoryEntry> {
        let _guard = self.lock();
        self.load()
    }

    pub fn get(&self, id: &str) -> Option<HistoryEntry> {
        self.list().into_iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the entry with `id`. Returns whether anything was removed; an unknown
    /// id is not an error.
    pub fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let _guard = self.lock();
        let mut entries = self.try_load()?;

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            debug!(id, "delete: no such history entry");
            return Ok(false);
        }

        self.store(&entries)?;
        info!(id, remaining = entries.len(), "deleted history entry");
        Ok(true)
    }

    /// Drop every entry by removing the record itself
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock();
        self.backend.remove(HISTORY_KEY)?;
        info!("cleared history");
        Ok(())
    }

    /// Read the record for display, degrading to empty on any failure
    fn load(&self) -> Vec<HistoryEntry> {
        self.try_load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read history, treating it as empty");
            Vec::new()
        })
    }

    /// Read the record. Absence and corruption read as empty; read failures propagate.
    fn try_load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let Some(raw) = self.backend.get(HISTORY_KEY)? else {
            return Ok(Vec::new());
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match parse_entries(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(error = %e, "history record is corrupt, treating it as empty");
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        let json = serde_json::to_string(entries)?;
        self.backend.set(HISTORY_KEY, &json)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_entries(raw: &str) -> Result<Vec<HistoryEntry>, StorageError> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::history::persistence::MemoryStore;
    use crate::models::{ContentKind, PayloadConfig};

    /// Memory store whose next `failing_reads` reads fail with an I/O error
    #[derive(Default)]
    struct FlakyReads {
        inner: MemoryStore,
        failing_reads: AtomicUsize,
    }

    impl FlakyReads {
        fn fail_next_read(&self) {
            self.failing_reads.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyReads {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let failing = self.failing_reads.load(Ordering::SeqCst);
            if failing > 0 {
                self.failing_reads.store(failing - 1, Ordering::SeqCst);
                let err = io::Error::new(io::ErrorKind::Interrupted, "disk hiccup");
                return Err(StorageError::Io(PathBuf::from(key), err));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn store() -> (HistoryStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        (HistoryStore::new(backend.clone()), backend)
    }

    fn entry(id: &str, name: &str) -> HistoryEntry {
        HistoryEntry::new(
            id,
            PayloadConfig::new(ContentKind::Text).with_text(name),
            1_700_000_000_000,
            name,
        )
    }

    fn ids(store: &HistoryStore) -> Vec<String> {
        store.list().into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_empty_when_nothing_stored() {
        let (store, _) = store();
        assert!(store.list().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_newest_first() {
        let (store, _) = store();
        store.save(entry("1", "one")).unwrap();
        store.save(entry("2", "two")).unwrap();
        store.save(entry("3", "three")).unwrap();
        assert_eq!(ids(&store), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_save_same_id_replaces_and_moves_to_front() {
        let (store, _) = store();
        store.save(entry("a", "first")).unwrap();
        store.save(entry("b", "other")).unwrap();
        store.save(entry("a", "renamed")).unwrap();

        let entries = store.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a");
        assert_eq!(entries[0].name, "renamed");
        assert_eq!(entries[1].id, "b");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (store, _) = store();
        for i in 0..=HISTORY_CAPACITY {
            store.save(entry(&i.to_string(), "x")).unwrap();
        }

        let ids = ids(&store);
        assert_eq!(ids.len(), HISTORY_CAPACITY);
        assert_eq!(ids.first().map(String::as_str), Some("50"));
        assert_eq!(ids.last().map(String::as_str), Some("1"));
        assert!(!ids.contains(&"0".to_string()));
    }

    #[test]
    fn test_resave_at_capacity_does_not_evict() {
        let (store, _) = store();
        for i in 0..HISTORY_CAPACITY {
            store.save(entry(&i.to_string(), "x")).unwrap();
        }
        store.save(entry("0", "again")).unwrap();

        let ids = ids(&store);
        assert_eq!(ids.len(), HISTORY_CAPACITY);
        assert_eq!(ids[0], "0");
        assert_eq!(ids.last().map(String::as_str), Some("1"));
    }

    #[test]
    fn test_delete_existing_and_missing() {
        let (store, _) = store();
        store.save(entry("a", "a")).unwrap();
        store.save(entry("b", "b")).unwrap();

        assert!(store.delete("a").unwrap());
        assert_eq!(ids(&store), vec!["b"]);

        assert!(!store.delete("nope").unwrap());
        assert_eq!(ids(&store), vec!["b"]);
    }

    #[test]
    fn test_clear_removes_record() {
        let (store, backend) = store();
        store.save(entry("a", "a")).unwrap();
        store.clear().unwrap();

        assert!(store.list().is_empty());
        assert_eq!(backend.get(HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_record_reads_as_empty() {
        let (store, backend) = store();
        backend.set(HISTORY_KEY, "{not json").unwrap();
        assert!(store.list().is_empty());

        // Saving over a corrupt record starts a fresh collection
        store.save(entry("a", "a")).unwrap();
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn test_wrong_shape_reads_as_empty() {
        let (store, backend) = store();
        backend.set(HISTORY_KEY, r#"{"id":"a"}"#).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let (store, _) = store();
        store.save(entry("a", "alpha")).unwrap();
        assert_eq!(store.get("a").map(|e| e.name), Some("alpha".to_string()));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_persisted_layout_is_plain_array() {
        let (store, backend) = store();
        store.save(entry("a", "alpha")).unwrap();

        let raw = backend.get(HISTORY_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["id"], "a");
        assert_eq!(array[0]["config"]["text"], "alpha");
    }

    #[test]
    fn test_read_failure_fails_save_and_keeps_history() {
        let backend = Arc::new(FlakyReads::default());
        let store = HistoryStore::new(backend.clone());
        for i in 0..10 {
            store.save(entry(&i.to_string(), "x")).unwrap();
        }

        backend.fail_next_read();
        let err = store.save(entry("new", "x")).unwrap_err();
        assert!(matches!(err, StorageError::Io(..)));
        assert_eq!(store.len(), 10);

        // Next save goes through on top of the intact record
        store.save(entry("new", "x")).unwrap();
        assert_eq!(store.len(), 11);
        assert_eq!(ids(&store)[0], "new");
    }

    #[test]
    fn test_read_failure_fails_delete_and_degrades_list() {
        let backend = Arc::new(FlakyReads::default());
        let store = HistoryStore::new(backend.clone());
        store.save(entry("a", "a")).unwrap();

        backend.fail_next_read();
        assert!(store.delete("a").is_err());

        backend.fail_next_read();
        assert!(store.list().is_empty());

        assert_eq!(ids(&store), vec!["a"]);
    }
}

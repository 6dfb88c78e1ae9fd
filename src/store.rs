//! The progress store: the sole mutable state of the application, mirrored
//! to a JSON record on every mutation.
//!
//! The record is one object mapping city ids to integer levels. Entries at
//! `Untouched` are never written; setting a city to `Untouched` deletes its
//! entry. A missing record reads back as empty progress.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use crate::error::StoreError;
use crate::level::TravelLevel;

/// Namespaced key for the durable record; versioned so a future format
/// change can migrate instead of misparsing.
pub const STORAGE_KEY: &str = "china_steps_progress_v1";

/// Where the durable record and log file live (`~/.chinasteps`).
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let mut path = dirs::home_dir().ok_or(StoreError::NoHome)?;
    path.push(".chinasteps");
    if !path.exists() {
        fs::create_dir_all(&path).map_err(|source| StoreError::CreateDir {
            path: path.clone(),
            source,
        })?;
    }
    Ok(path)
}

/// Seam between the store and durable storage, so tests can observe persist
/// calls and the production backend stays a plain file.
pub trait StorageBackend {
    /// `Ok(None)` means the record has never been written.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, payload: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_data_dir() -> Result<Self, StoreError> {
        Ok(Self::new(data_dir()?.join(format!("{STORAGE_KEY}.json"))))
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<String>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, payload: &str) -> Result<(), StoreError> {
        fs::write(&self.path, payload).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.path).map_err(|source| StoreError::Clear {
            path: self.path.clone(),
            source,
        })
    }
}

pub struct ProgressStore {
    levels: HashMap<String, TravelLevel>,
    backend: Box<dyn StorageBackend>,
}

impl ProgressStore {
    /// Loads the durable record. A record that cannot be read or parsed is
    /// discarded with a warning; the app starts with empty progress rather
    /// than crashing.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let levels = match Self::load_levels(backend.as_ref()) {
            Ok(levels) => levels,
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable progress record");
                HashMap::new()
            }
        };
        Self { levels, backend }
    }

    fn load_levels(backend: &dyn StorageBackend) -> Result<HashMap<String, TravelLevel>, StoreError> {
        let Some(payload) = backend.load()? else {
            return Ok(HashMap::new());
        };
        let raw: HashMap<String, u8> = serde_json::from_str(&payload)?;
        let mut levels = HashMap::with_capacity(raw.len());
        for (city_id, ord) in raw {
            match TravelLevel::from_ordinal(ord) {
                Some(TravelLevel::Untouched) | None => {
                    // 0 should never have been persisted; anything above 3 is
                    // corruption. Drop the entry, keep the rest.
                    tracing::warn!(city = %city_id, level = ord, "dropping invalid progress entry");
                }
                Some(level) => {
                    levels.insert(city_id, level);
                }
            }
        }
        Ok(levels)
    }

    /// A city absent from the record is `Untouched`.
    pub fn get(&self, city_id: &str) -> TravelLevel {
        self.levels.get(city_id).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Sets one city's level and persists the whole record once.
    pub fn set(&mut self, city_id: &str, level: TravelLevel) {
        self.apply(city_id, level);
        self.persist();
    }

    /// Applies a batch of updates atomically from the caller's perspective
    /// and persists exactly once.
    pub fn set_many<I, S>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (S, TravelLevel)>,
        S: AsRef<str>,
    {
        for (city_id, level) in updates {
            self.apply(city_id.as_ref(), level);
        }
        self.persist();
    }

    /// Clears everything and removes the durable record entirely.
    pub fn reset(&mut self) {
        self.levels.clear();
        if let Err(err) = self.backend.clear() {
            tracing::warn!(error = %err, "failed to remove progress record");
        }
    }

    fn apply(&mut self, city_id: &str, level: TravelLevel) {
        if level == TravelLevel::Untouched {
            self.levels.remove(city_id);
        } else {
            self.levels.insert(city_id.to_string(), level);
        }
    }

    /// Serializes the full mapping. A failed write is logged and otherwise
    /// ignored: the in-memory state stays authoritative until the next
    /// successful persist.
    fn persist(&self) {
        let record: BTreeMap<&str, u8> = self
            .levels
            .iter()
            .map(|(id, level)| (id.as_str(), level.ordinal()))
            .collect();
        let payload = match serde_json::to_string(&record) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode progress record");
                return;
            }
        };
        if let Err(err) = self.backend.save(&payload) {
            tracing::warn!(error = %err, "progress not persisted, keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct MemoryBackend {
        record: RefCell<Option<String>>,
        saves: Cell<usize>,
        clears: Cell<usize>,
        fail_saves: Cell<bool>,
    }

    impl StorageBackend for Rc<MemoryBackend> {
        fn load(&self) -> Result<Option<String>, StoreError> {
            Ok(self.record.borrow().clone())
        }

        fn save(&self, payload: &str) -> Result<(), StoreError> {
            self.saves.set(self.saves.get() + 1);
            if self.fail_saves.get() {
                return Err(StoreError::Write {
                    path: PathBuf::from("memory"),
                    source: std::io::Error::other("quota exceeded"),
                });
            }
            *self.record.borrow_mut() = Some(payload.to_string());
            Ok(())
        }

        fn clear(&self) -> Result<(), StoreError> {
            self.clears.set(self.clears.get() + 1);
            *self.record.borrow_mut() = None;
            Ok(())
        }
    }

    fn memory_store() -> (ProgressStore, Rc<MemoryBackend>) {
        let backend = Rc::new(MemoryBackend::default());
        let store = ProgressStore::open(Box::new(Rc::clone(&backend)));
        (store, backend)
    }

    #[test]
    fn absent_city_reads_untouched() {
        let (store, _) = memory_store();
        assert_eq!(store.get("city-0-0"), TravelLevel::Untouched);
    }

    #[test]
    fn setting_untouched_deletes_the_entry() {
        let (mut store, backend) = memory_store();
        store.set("city-0-0", TravelLevel::Lived);
        assert_eq!(store.get("city-0-0"), TravelLevel::Lived);

        store.set("city-0-0", TravelLevel::Untouched);
        assert_eq!(store.get("city-0-0"), TravelLevel::Untouched);
        assert!(store.is_empty());
        let record = backend.record.borrow().clone().unwrap();
        assert_eq!(record, "{}");
    }

    #[test]
    fn set_is_idempotent() {
        let (mut store, backend) = memory_store();
        store.set("city-1-2", TravelLevel::Visited);
        let first = backend.record.borrow().clone();
        store.set("city-1-2", TravelLevel::Visited);
        assert_eq!(backend.record.borrow().clone(), first);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn batch_applies_atomically_with_one_persist() {
        let (mut store, backend) = memory_store();
        store.set_many([
            ("a".to_string(), TravelLevel::Passed),
            ("b".to_string(), TravelLevel::Visited),
        ]);
        assert_eq!(store.get("a"), TravelLevel::Passed);
        assert_eq!(store.get("b"), TravelLevel::Visited);
        assert_eq!(backend.saves.get(), 1);
    }

    #[test]
    fn batch_untouched_clears_entries() {
        let (mut store, _) = memory_store();
        store.set_many([
            ("a".to_string(), TravelLevel::Lived),
            ("b".to_string(), TravelLevel::Passed),
        ]);
        store.set_many([
            ("a".to_string(), TravelLevel::Untouched),
            ("b".to_string(), TravelLevel::Untouched),
        ]);
        assert!(store.is_empty());
    }

    #[test]
    fn reset_round_trips_to_empty() {
        let (mut store, backend) = memory_store();
        store.set("a", TravelLevel::Lived);
        store.reset();
        assert!(store.is_empty());
        assert_eq!(backend.clears.get(), 1);
        assert!(backend.record.borrow().is_none());

        // Reloading from the same backend yields an empty store.
        let reloaded = ProgressStore::open(Box::new(Rc::clone(&backend)));
        assert!(reloaded.is_empty());
    }

    #[test]
    fn malformed_record_starts_empty() {
        let backend = Rc::new(MemoryBackend::default());
        *backend.record.borrow_mut() = Some("not json at all".to_string());
        let store = ProgressStore::open(Box::new(Rc::clone(&backend)));
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_entries_are_dropped_individually() {
        let backend = Rc::new(MemoryBackend::default());
        *backend.record.borrow_mut() = Some(r#"{"a":2,"b":9,"c":0}"#.to_string());
        let store = ProgressStore::open(Box::new(Rc::clone(&backend)));
        assert_eq!(store.get("a"), TravelLevel::Visited);
        assert_eq!(store.get("b"), TravelLevel::Untouched);
        assert_eq!(store.get("c"), TravelLevel::Untouched);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn persist_failure_keeps_memory_authoritative() {
        let (mut store, backend) = memory_store();
        backend.fail_saves.set(true);
        store.set("a", TravelLevel::Lived);
        assert_eq!(store.get("a"), TravelLevel::Lived);
        assert!(backend.record.borrow().is_none());

        // Next successful write carries the full state.
        backend.fail_saves.set(false);
        store.set("b", TravelLevel::Passed);
        let record = backend.record.borrow().clone().unwrap();
        assert!(record.contains("\"a\":3"));
        assert!(record.contains("\"b\":1"));
    }

    #[test]
    fn file_backend_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "chinasteps-test-{}-{:?}.json",
            std::process::id(),
            std::thread::current().id()
        ));
        let backend = JsonFileBackend::new(path.clone());
        let _ = backend.clear();

        assert!(backend.load().unwrap().is_none());
        backend.save(r#"{"city-0-0":2}"#).unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), r#"{"city-0-0":2}"#);
        backend.clear().unwrap();
        assert!(backend.load().unwrap().is_none());
        assert!(!path.exists());
    }
}

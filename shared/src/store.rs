use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage key for the recent-search list.
pub const HISTORY_KEY: &str = "search_history";
/// Storage key for bookmarked players.
pub const FAVORITES_KEY: &str = "favorites";
/// Event name broadcast to same-origin views after every history write.
pub const HISTORY_EVENT: &str = "search-history-updated";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored value could not be (de)serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value persistence (browser local storage, files, memory).
pub trait KeyValueStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Tells other views sharing the same storage that `key` changed.
pub trait ChangeNotifier {
    fn notify(&self, key: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _key: &str) {}
}

pub(crate) fn load_json<S, T>(storage: &S, key: &str) -> Result<Option<T>, StorageError>
where
    S: KeyValueStorage + ?Sized,
    T: DeserializeOwned,
{
    match storage.read(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub(crate) fn save_json<S, T>(storage: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    S: KeyValueStorage + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    storage.write(key, &raw)
}

/// In-process storage. Clones share the same map and write switch, which lets
/// tests model two views over one origin.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    read_only: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every write, like a browser with storage disabled
    /// or over quota.
    pub fn read_only() -> Self {
        let storage = Self::default();
        storage.reject_writes(true);
        storage
    }

    /// Start (or stop) failing writes, e.g. once the quota fills up.
    pub fn reject_writes(&self, reject: bool) {
        self.read_only.store(reject, Ordering::Relaxed);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.load(Ordering::Relaxed) {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.write("k", "v").expect("write should succeed");
        assert_eq!(b.read("k").expect("read should succeed").as_deref(), Some("v"));
    }

    #[test]
    fn json_helpers_round_trip_and_report_corruption() {
        let storage = MemoryStorage::new();
        save_json(&storage, "list", &["a", "b"]).expect("save should succeed");
        let loaded: Option<Vec<String>> = load_json(&storage, "list").expect("load should succeed");
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));

        storage.write("list", "{not json").expect("write should succeed");
        let corrupt: Result<Option<Vec<String>>, _> = load_json(&storage, "list");
        assert!(matches!(corrupt, Err(StorageError::Serialize(_))));
    }

    #[test]
    fn read_only_storage_rejects_writes() {
        let storage = MemoryStorage::read_only();
        assert!(matches!(
            storage.write("k", "v"),
            Err(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn write_switch_is_shared_between_clones() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.write("k", "v").expect("write should succeed");
        b.reject_writes(true);
        assert!(a.write("k", "w").is_err());
        assert_eq!(a.raw("k").as_deref(), Some("v"));
    }
}

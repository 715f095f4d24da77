use tracing::warn;

use crate::store::{ChangeNotifier, HISTORY_KEY, KeyValueStorage, load_json, save_json};

pub const MAX_HISTORY: usize = 5;

/// Recent search terms, newest first, case-insensitively unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    terms: Vec<String>,
}

impl SearchHistory {
    pub fn from_terms(terms: Vec<String>) -> Self {
        let mut history = Self::default();
        // Oldest first so the stored order survives normalisation.
        for term in terms.into_iter().rev() {
            history.add(&term);
        }
        history
    }

    /// Move `term` (trimmed) to the front. Returns `false` for blank input.
    pub fn add(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let folded = term.to_lowercase();
        self.terms.retain(|existing| existing.to_lowercase() != folded);
        self.terms.insert(0, term.to_owned());
        self.terms.truncate(MAX_HISTORY);
        true
    }

    /// Remove entries equal to `term` exactly. Returns whether anything changed.
    pub fn remove(&mut self, term: &str) -> bool {
        let before = self.terms.len();
        self.terms.retain(|existing| existing != term);
        self.terms.len() != before
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Persisted search history. The in-memory list is authoritative for the
/// session; persistence failures are logged and otherwise ignored.
pub struct SearchHistoryStore<S, N> {
    storage: S,
    notifier: N,
    history: SearchHistory,
    /// Set while the last save failed; storage is then older than memory.
    unsaved: bool,
}

impl<S: KeyValueStorage, N: ChangeNotifier> SearchHistoryStore<S, N> {
    /// Load whatever is persisted; unreadable data starts an empty history.
    pub fn init(storage: S, notifier: N) -> Self {
        let history = read_history(&storage).unwrap_or_default();
        Self {
            storage,
            notifier,
            history,
            unsaved: false,
        }
    }

    /// Read-modify-persist: another view may have written since our last read.
    pub fn add(&mut self, term: &str) {
        self.reload();
        if self.history.add(term) {
            self.persist();
        }
    }

    pub fn remove(&mut self, term: &str) {
        self.reload();
        if self.history.remove(term) {
            self.persist();
        }
    }

    pub fn list(&self) -> &[String] {
        self.history.terms()
    }

    /// Re-read after another view reported a change. Keeps the current list when
    /// nothing readable is stored or when our own last save failed.
    pub fn reload(&mut self) -> bool {
        if self.unsaved {
            return false;
        }
        match read_history(&self.storage) {
            Some(history) if history != self.history => {
                self.history = history;
                true
            }
            _ => false,
        }
    }

    fn persist(&mut self) {
        match save_json(&self.storage, HISTORY_KEY, self.history.terms()) {
            Ok(()) => {
                self.unsaved = false;
                self.notifier.notify(HISTORY_KEY);
            }
            Err(e) => {
                self.unsaved = true;
                warn!(error = %e, "failed to save search history");
            }
        }
    }
}

fn read_history<S: KeyValueStorage>(storage: &S) -> Option<SearchHistory> {
    match load_json::<_, Vec<String>>(storage, HISTORY_KEY) {
        Ok(Some(terms)) => Some(SearchHistory::from_terms(terms)),
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "failed to load search history");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::store::{MemoryStorage, NoopNotifier};

    #[derive(Default)]
    struct CountingNotifier(Cell<u32>);

    impl ChangeNotifier for &CountingNotifier {
        fn notify(&self, key: &str) {
            assert_eq!(key, HISTORY_KEY);
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn case_and_whitespace_variants_collapse_to_latest() {
        let mut history = SearchHistory::default();
        history.add("  notch ");
        history.add("Notch");
        assert_eq!(history.terms(), ["Notch".to_string()]);
    }

    #[test]
    fn history_is_capped_and_evicts_oldest() {
        let mut history = SearchHistory::default();
        for term in ["a", "b", "c", "d", "e", "f", "g"] {
            history.add(term);
        }
        assert_eq!(history.terms(), ["g", "f", "e", "d", "c"]);
    }

    #[test]
    fn blank_terms_are_ignored() {
        let mut history = SearchHistory::default();
        assert!(!history.add("   "));
        assert!(history.terms().is_empty());
    }

    #[test]
    fn remove_is_case_sensitive() {
        let mut history = SearchHistory::default();
        history.add("Notch");
        assert!(!history.remove("notch"));
        assert!(history.remove("Notch"));
        assert!(history.terms().is_empty());
    }

    #[test]
    fn store_persists_and_notifies() {
        let storage = MemoryStorage::new();
        let notifier = CountingNotifier::default();
        let mut store = SearchHistoryStore::init(storage.clone(), &notifier);

        store.add("Notch");
        store.add("jeb_");
        store.add("  ");

        assert_eq!(store.list(), ["jeb_", "Notch"]);
        assert_eq!(notifier.0.get(), 2);
        assert_eq!(
            storage.raw(HISTORY_KEY).as_deref(),
            Some(r#"["jeb_","Notch"]"#)
        );
    }

    #[test]
    fn second_view_picks_up_changes_on_reload() {
        let storage = MemoryStorage::new();
        let mut first = SearchHistoryStore::init(storage.clone(), NoopNotifier);
        let mut second = SearchHistoryStore::init(storage, NoopNotifier);

        first.add("Dinnerbone");
        assert!(second.list().is_empty());
        assert!(second.reload());
        assert_eq!(second.list(), ["Dinnerbone"]);
        assert!(!second.reload());
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let mut store = SearchHistoryStore::init(MemoryStorage::read_only(), NoopNotifier);
        store.add("Notch");
        assert_eq!(store.list(), ["Notch"]);
    }

    #[test]
    fn failed_save_is_not_undone_by_the_next_add() {
        let storage = MemoryStorage::new();
        storage
            .write(HISTORY_KEY, r#"["a"]"#)
            .expect("write should succeed");
        let mut store = SearchHistoryStore::init(storage.clone(), NoopNotifier);
        storage.reject_writes(true);

        store.add("b");
        store.add("c");
        assert_eq!(store.list(), ["c", "b", "a"]);
        assert!(!store.reload());

        storage.reject_writes(false);
        store.remove("a");
        assert_eq!(store.list(), ["c", "b"]);
        assert_eq!(storage.raw(HISTORY_KEY).as_deref(), Some(r#"["c","b"]"#));
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let storage = MemoryStorage::new();
        storage
            .write(HISTORY_KEY, "not json")
            .expect("write should succeed");
        let store = SearchHistoryStore::init(storage, NoopNotifier);
        assert!(store.list().is_empty());
    }
}

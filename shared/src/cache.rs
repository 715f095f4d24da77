use std::collections::HashMap;
use std::hash::Hash;

use crate::query::{FetchOutcome, QueryState};

/// Per-key query results. Each key runs its own `Idle -> Pending -> terminal`
/// lifecycle; a terminal entry only leaves that state through [`QueryCache::invalidate`].
#[derive(Debug, Clone)]
pub struct QueryCache<K, T> {
    entries: HashMap<K, QueryState<T>>,
}

impl<K, T> Default for QueryCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> QueryCache<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight. Returns `true` only when the caller must issue the
    /// network request; cached and already-pending entries return `false`.
    pub fn begin(&mut self, key: K) -> bool {
        let state = self.entries.entry(key).or_default();
        if matches!(state, QueryState::Idle) {
            *state = QueryState::Pending;
            true
        } else {
            false
        }
    }

    /// Store the result of an in-flight request. Responses for entries that are
    /// not pending (evicted, or already settled) are dropped.
    pub fn settle(&mut self, key: &K, outcome: FetchOutcome<T>) -> bool {
        match self.entries.get_mut(key) {
            Some(state) if state.is_pending() => {
                *state = QueryState::from_outcome(outcome);
                true
            }
            _ => false,
        }
    }

    /// Send a terminal entry back to `Pending`. Returns `true` when the caller
    /// must refetch.
    pub fn invalidate(&mut self, key: &K) -> bool {
        match self.entries.get_mut(key) {
            Some(state) if state.is_terminal() => {
                *state = QueryState::Pending;
                true
            }
            _ => false,
        }
    }

    pub fn evict(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn state(&self, key: &K) -> QueryState<&T> {
        self.entries
            .get(key)
            .map(QueryState::as_ref)
            .unwrap_or(QueryState::Idle)
    }

    pub fn get(&self, key: &K) -> Option<&T> {
        self.entries.get(key).and_then(QueryState::data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

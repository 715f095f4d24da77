use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{FAVORITES_KEY, KeyValueStorage, load_json, save_json};

/// A bookmarked player, unique by uuid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub uuid: String,
    pub username: String,
    #[serde(rename = "addedOn")]
    pub added_on: DateTime<Utc>,
}

/// Persisted favorites. Every change re-reads storage first, so a favorite
/// added from another view survives; writes are best-effort like
/// [`crate::history::SearchHistoryStore`].
pub struct FavoritesStore<S> {
    storage: S,
    favorites: Vec<Favorite>,
    /// Set while the last save failed; storage is then older than memory.
    unsaved: bool,
}

impl<S: KeyValueStorage> FavoritesStore<S> {
    pub fn init(storage: S) -> Self {
        let favorites = read_favorites(&storage).unwrap_or_default();
        Self {
            storage,
            favorites,
            unsaved: false,
        }
    }

    pub fn list(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.favorites.iter().any(|f| f.uuid == uuid)
    }

    /// Bookmark a player. Re-adding keeps the original `added_on`.
    pub fn add(&mut self, uuid: &str, username: &str, now: DateTime<Utc>) -> bool {
        self.reload();
        if uuid.is_empty() || self.contains(uuid) {
            return false;
        }
        self.favorites.push(Favorite {
            uuid: uuid.to_owned(),
            username: username.to_owned(),
            added_on: now,
        });
        self.persist();
        true
    }

    pub fn remove(&mut self, uuid: &str) -> bool {
        self.reload();
        let before = self.favorites.len();
        self.favorites.retain(|f| f.uuid != uuid);
        let changed = self.favorites.len() != before;
        if changed {
            self.persist();
        }
        changed
    }

    /// Pick up changes written by another view. Keeps the current list when
    /// nothing readable is stored or when our own last save failed.
    pub fn reload(&mut self) -> bool {
        if self.unsaved {
            return false;
        }
        match read_favorites(&self.storage) {
            Some(favorites) if favorites != self.favorites => {
                self.favorites = favorites;
                true
            }
            _ => false,
        }
    }

    fn persist(&mut self) {
        match save_json(&self.storage, FAVORITES_KEY, &self.favorites) {
            Ok(()) => self.unsaved = false,
            Err(e) => {
                self.unsaved = true;
                warn!(error = %e, "failed to save favorites");
            }
        }
    }
}

fn read_favorites<S: KeyValueStorage>(storage: &S) -> Option<Vec<Favorite>> {
    match load_json::<_, Vec<Favorite>>(storage, FAVORITES_KEY) {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %e, "failed to load favorites");
            None
        }
    }
}

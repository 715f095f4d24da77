use aspexis_shared::store::{ChangeNotifier, HISTORY_EVENT, HISTORY_KEY, KeyValueStorage, StorageError};
use aspexis_shared::{FavoritesStore, SearchHistoryStore};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

pub type HistoryStore = SearchHistoryStore<BrowserStorage, WindowNotifier>;
pub type Favorites = FavoritesStore<BrowserStorage>;

pub(crate) fn log_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// `window.localStorage`, looked up per call. Private browsing and disabled
/// storage surface as `Unavailable` instead of a panic.
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".into()))?
        .local_storage()
        .map_err(|e| StorageError::Unavailable(js_error(&e)))?
        .ok_or_else(|| StorageError::Unavailable("local storage disabled".into()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_error(&e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(js_error(&e)))
    }
}

/// Fires `search-history-updated` on `window` so every view in this document
/// re-reads. Other tabs get the browser's own `storage` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowNotifier;

impl ChangeNotifier for WindowNotifier {
    fn notify(&self, _key: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        match web_sys::Event::new(HISTORY_EVENT) {
            Ok(event) => {
                let _ = window.dispatch_event(&event);
            }
            Err(e) => log_warn(&format!("failed to create {HISTORY_EVENT} event: {}", js_error(&e))),
        }
    }
}

pub fn open_history() -> HistoryStore {
    SearchHistoryStore::init(BrowserStorage, WindowNotifier)
}

pub fn open_favorites() -> Favorites {
    FavoritesStore::init(BrowserStorage)
}

/// Re-read `history` after a write from this document or another tab.
pub fn watch_history(history: RwSignal<HistoryStore>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_change = Closure::<dyn Fn(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Some(storage_event) = event.dyn_ref::<web_sys::StorageEvent>()
            && storage_event
                .key()
                .is_some_and(|key| key != HISTORY_KEY)
        {
            return;
        }
        let changed = history
            .try_update_untracked(|store| store.reload())
            .unwrap_or(false);
        if changed {
            history.notify();
        }
    });
    for event_name in [HISTORY_EVENT, "storage"] {
        if let Err(e) =
            window.add_event_listener_with_callback(event_name, on_change.as_ref().unchecked_ref())
        {
            log_warn(&format!("failed to listen for {event_name}: {}", js_error(&e)));
        }
    }
    on_change.forget();
}

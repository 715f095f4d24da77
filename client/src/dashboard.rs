use aspexis_shared::{AbilityClass, PlayerSession, ServiceSection, ServiceTab, SessionEvent};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::storage::{Favorites, HistoryStore, log_warn, open_favorites, open_history};

/// Reactive handle on the player session and the persisted stores. Every
/// user action funnels through here and ends with a [`Dashboard::pump`].
#[derive(Clone, Copy)]
pub struct Dashboard {
    pub session: RwSignal<PlayerSession>,
    pub history: RwSignal<HistoryStore>,
    pub favorites: RwSignal<Favorites>,
    api_base: RwSignal<Option<String>>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(PlayerSession::new()),
            history: RwSignal::new(open_history()),
            favorites: RwSignal::new(open_favorites()),
            api_base: RwSignal::new(None),
        }
    }

    /// Nothing is fetched until the backend base URL is known.
    pub fn configure(&self, base: String) {
        self.api_base.set(Some(base));
        self.pump();
    }

    /// Tracked, so effects that fetch on their own rerun once config arrives.
    pub fn api_base(&self) -> Option<String> {
        self.api_base.get()
    }

    pub fn search(&self, term: &str) {
        match self.session.try_update(|session| session.search(term)) {
            Some(Ok(true)) => self.pump(),
            Some(Ok(false)) | None => {}
            Some(Err(e)) => log_warn(&format!("ignoring search: {e}")),
        }
    }

    /// Issue every request the session says is ready; each completion pumps again
    /// so dependent fetches follow.
    pub fn pump(&self) {
        let Some(base) = self.api_base.get_untracked() else {
            return;
        };
        let requests = self
            .session
            .try_update(PlayerSession::poll_requests)
            .unwrap_or_default();
        for key in requests {
            let base = base.clone();
            let this = *self;
            spawn_local(async move {
                let response = api::fetch(&base, &key).await;
                let event = this.session.try_update(|session| session.complete(&key, response));
                if let Some(SessionEvent::IdentityResolved(identity)) = event {
                    this.history.update(|history| history.add(&identity.username));
                }
                this.pump();
            });
        }
    }

    /// Re-read favorites another tab may have written since startup.
    pub fn reload_favorites(&self) {
        let changed = self
            .favorites
            .try_update_untracked(|favorites| favorites.reload())
            .unwrap_or(false);
        if changed {
            self.favorites.notify();
        }
    }

    pub fn select_tab(&self, tab: ServiceTab) {
        self.session.update(|session| session.select_tab(tab));
    }

    pub fn select_metric(&self, metric_key: &str) {
        self.session.update(|session| session.select_metric(metric_key));
        self.pump();
    }

    pub fn clear_metric(&self) {
        self.session.update(PlayerSession::clear_metric);
    }

    pub fn load_more_guild_members(&self) {
        self.session.update(PlayerSession::load_more_guild_members);
        self.pump();
    }

    pub fn select_ability_tree(&self, character_uuid: &str, class: AbilityClass) {
        self.session
            .update(|session| session.select_ability_tree(character_uuid, class));
        self.pump();
    }

    pub fn refresh(&self, section: ServiceSection) {
        if self
            .session
            .try_update(|session| session.refresh(section))
            .unwrap_or(false)
        {
            self.pump();
        }
    }
}

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::dashboard::Dashboard;
use crate::favorites::FavoritesPage;
use crate::player::PlayerPage;
use crate::search::{RecentSearches, SearchBar};
use crate::storage::{log_warn, watch_history};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Home,
    Player(String),
    Favorites,
}

impl Route {
    pub(crate) fn from_path(path: &str, decode: impl Fn(&str) -> String) -> Self {
        let path = path.trim_end_matches('/');
        if path == "/favorites" {
            return Self::Favorites;
        }
        match path.strip_prefix("/player/") {
            Some(raw) if !raw.is_empty() && !raw.contains('/') => {
                let term = decode(raw);
                if term.trim().is_empty() {
                    Self::Home
                } else {
                    Self::Player(term)
                }
            }
            _ => Self::Home,
        }
    }

    pub(crate) fn to_path(&self, encode: impl Fn(&str) -> String) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Player(term) => format!("/player/{}", encode(term.trim())),
            Self::Favorites => "/favorites".to_string(),
        }
    }
}

fn decode_component(raw: &str) -> String {
    js_sys::decode_uri_component(raw)
        .map(String::from)
        .unwrap_or_else(|_| raw.to_string())
}

fn encode_component(raw: &str) -> String {
    String::from(js_sys::encode_uri_component(raw))
}

fn current_route() -> Route {
    let path = web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .unwrap_or_default();
    Route::from_path(&path, decode_component)
}

/// Router signal wrapper for context.
#[derive(Clone, Copy)]
pub(crate) struct CurrentRoute(pub RwSignal<Route>);

pub(crate) fn navigate(route: RwSignal<Route>, next: Route) {
    if route.get_untracked() == next {
        return;
    }
    if let Some(window) = web_sys::window()
        && let Ok(history) = window.history()
    {
        let path = next.to_path(encode_component);
        if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(&path)) {
            log_warn(&format!("pushState failed: {e:?}"));
        }
    }
    route.set(next);
}

fn watch_popstate(route: RwSignal<Route>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_pop = Closure::<dyn Fn(web_sys::Event)>::new(move |_: web_sys::Event| {
        route.set(current_route());
    });
    if window
        .add_event_listener_with_callback("popstate", on_pop.as_ref().unchecked_ref())
        .is_err()
    {
        log_warn("failed to listen for popstate");
    }
    on_pop.forget();
}

#[component]
pub fn App() -> impl IntoView {
    let dashboard = Dashboard::new();
    let route = RwSignal::new(current_route());
    provide_context(dashboard);
    provide_context(CurrentRoute(route));

    watch_history(dashboard.history);
    watch_popstate(route);

    spawn_local(async move {
        let config = api::load_client_config().await;
        let origin = api::origin();
        dashboard.configure(config.base_url_or(&origin).to_string());
    });

    // Player routes drive the session; the term in the URL is the search term.
    Effect::new(move || {
        if let Route::Player(term) = route.get() {
            dashboard.search(&term);
        }
    });

    let page = move || match route.get() {
        Route::Home => view! { <HomePage /> }.into_any(),
        Route::Player(_) => view! { <PlayerPage /> }.into_any(),
        Route::Favorites => view! { <FavoritesPage /> }.into_any(),
    };

    view! {
        <div style="max-width: 960px; margin: 0 auto; padding: 16px 20px 48px;">
            <header style="display: flex; align-items: center; gap: 16px; padding-bottom: 16px; border-bottom: 1px solid #282c3e;">
                <span
                    style="font-family: 'Silkscreen', monospace; font-size: 1.1rem; letter-spacing: 0.12em; color: #f5c542; cursor: pointer;"
                    on:click=move |_| navigate(route, Route::Home)
                >"ASPEXIS"</span>
                <div style="flex: 1;">
                    <SearchBar />
                </div>
                <span
                    style="font-size: 0.85rem; color: #9a9590; cursor: pointer;"
                    on:click=move |_| navigate(route, Route::Favorites)
                >"Favorites"</span>
            </header>
            <main style="padding-top: 20px;">{page}</main>
        </div>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    view! {
        <section>
            <h1 style="font-size: 1.4rem; font-weight: 600; margin: 0 0 8px;">"Minecraft player lookup"</h1>
            <p style="color: #9a9590; margin: 0 0 24px;">
                "Search a username or UUID to see Hypixel, Wynncraft, Donut SMP and MCC Island stats."
            </p>
            <RecentSearches />
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(raw: &str) -> String {
        raw.to_string()
    }

    #[test]
    fn parses_player_and_favorites_paths() {
        assert_eq!(Route::from_path("/", plain), Route::Home);
        assert_eq!(Route::from_path("/favorites/", plain), Route::Favorites);
        assert_eq!(
            Route::from_path("/player/Notch", plain),
            Route::Player("Notch".into())
        );
        assert_eq!(Route::from_path("/player/", plain), Route::Home);
        assert_eq!(Route::from_path("/player/a/b", plain), Route::Home);
        assert_eq!(Route::from_path("/unknown", plain), Route::Home);
    }

    #[test]
    fn blank_decoded_term_goes_home() {
        assert_eq!(Route::from_path("/player/%20", |_| " ".to_string()), Route::Home);
    }

    #[test]
    fn player_path_is_encoded_and_trimmed() {
        let path = Route::Player(" jeb_ ".into()).to_path(|raw| raw.replace('_', "%5F"));
        assert_eq!(path, "/player/jeb%5F");
        assert_eq!(Route::Favorites.to_path(plain), "/favorites");
    }
}

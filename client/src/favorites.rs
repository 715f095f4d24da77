use aspexis_shared::format::relative_age;
use aspexis_shared::player::PlayerIdentity;
use aspexis_shared::query::decode_response;
use aspexis_shared::{Favorite, QueryCache, QueryKey};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::app::{CurrentRoute, Route, navigate};
use crate::dashboard::Dashboard;

/// Name to show for a favorite: the freshly resolved username when known.
pub(crate) fn display_name(favorite: &Favorite, resolved: Option<&PlayerIdentity>) -> String {
    resolved
        .map(|identity| identity.username.clone())
        .unwrap_or_else(|| favorite.username.clone())
}

/// Favorites open by uuid; the stored username may belong to someone else by now.
pub(crate) fn favorite_route(favorite: &Favorite) -> Route {
    Route::Player(favorite.uuid.clone())
}

#[component]
pub fn FavoritesPage() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let CurrentRoute(route) = expect_context::<CurrentRoute>();
    dashboard.reload_favorites();
    let resolved = RwSignal::new(QueryCache::<String, PlayerIdentity>::new());
    let favorites = Memo::new(move |_| dashboard.favorites.with(|store| store.list().to_vec()));

    // Re-resolve each favorite by uuid so renamed players show their current name.
    Effect::new(move || {
        let Some(base) = dashboard.api_base() else {
            return;
        };
        for favorite in favorites.get() {
            let uuid = favorite.uuid;
            if !resolved.try_update(|cache| cache.begin(uuid.clone())).unwrap_or(false) {
                continue;
            }
            let base = base.clone();
            spawn_local(async move {
                let key = QueryKey::Identity(uuid.clone());
                let outcome = api::fetch(&base, &key)
                    .await
                    .and_then(|response| decode_response(response.status, &response.body));
                resolved.update(|cache| {
                    cache.settle(&uuid, outcome);
                });
            });
        }
    });

    view! {
        <section>
            <h1 style="font-size: 1.4rem; font-weight: 600; margin: 0 0 16px;">"Favorites"</h1>
            <Show
                when=move || !favorites.with(Vec::is_empty)
                fallback=|| view! {
                    <p style="color: #9a9590; font-size: 0.85rem;">"No favorites yet. Star a player from their page."</p>
                }
            >
                <For
                    each=move || favorites.get()
                    key=|favorite| favorite.uuid.clone()
                    children=move |favorite| {
                        let uuid = favorite.uuid.clone();
                        let open = favorite_route(&favorite);
                        let name = Memo::new({
                            let favorite = favorite.clone();
                            move |_| resolved.with(|cache| display_name(&favorite, cache.get(&favorite.uuid)))
                        });
                        let age = relative_age(favorite.added_on, chrono::Utc::now());
                        view! {
                            <div style="display: flex; align-items: center; gap: 12px; padding: 10px 12px; margin-bottom: 6px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px;">
                                <div style="flex: 1;">
                                    <div
                                        style="color: #e2e0d8; font-weight: 600; cursor: pointer;"
                                        on:click=move |_| navigate(route, open.clone())
                                    >{move || name.get()}</div>
                                    <div style="font-size: 0.7rem; color: #5a5860;">{format!("Added {age}")}</div>
                                </div>
                                <button
                                    style="padding: 5px 10px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 4px; color: #9a9590; cursor: pointer; font-size: 0.8rem;"
                                    on:click=move |_| dashboard.favorites.update(|store| {
                                        store.remove(&uuid);
                                    })
                                >"Remove"</button>
                            </div>
                        }
                    }
                />
            </Show>
        </section>
    }
}

use leptos::prelude::*;

use crate::app::{CurrentRoute, Route, navigate};
use crate::dashboard::Dashboard;

fn history_terms(dashboard: Dashboard) -> Memo<Vec<String>> {
    Memo::new(move |_| dashboard.history.with(|history| history.list().to_vec()))
}

#[component]
pub fn SearchBar() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let CurrentRoute(route) = expect_context::<CurrentRoute>();
    let query = RwSignal::new(String::new());
    let focused = RwSignal::new(false);
    let terms = history_terms(dashboard);

    let submit = move |term: String| {
        let term = term.trim().to_string();
        if term.is_empty() {
            return;
        }
        query.set(String::new());
        focused.set(false);
        navigate(route, Route::Player(term));
    };

    let on_input = move |ev: leptos::ev::Event| query.set(event_target_value(&ev));
    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Enter" {
            submit(query.get_untracked());
        }
    };
    let dropdown_open = move || focused.get() && query.with(String::is_empty) && !terms.with(Vec::is_empty);

    view! {
        <div style="position: relative;">
            <input
                style="width: 100%; padding: 9px 14px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-family: 'Inter', system-ui, sans-serif; font-size: 0.9rem; outline: none;"
                type="text"
                placeholder="Username or UUID..."
                prop:value=move || query.get()
                on:input=on_input
                on:keydown=on_keydown
                on:focus=move |_| focused.set(true)
                on:blur=move |_| focused.set(false)
            />
            <Show when=dropdown_open>
                <div style="position: absolute; top: calc(100% + 4px); left: 0; right: 0; z-index: 20; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; overflow: hidden;">
                    <div style="padding: 6px 12px; font-size: 0.65rem; text-transform: uppercase; letter-spacing: 0.12em; color: #5a5860;">"Recent"</div>
                    <For
                        each=move || terms.get()
                        key=|term| term.clone()
                        children=move |term| {
                            let pick = term.clone();
                            let forget = term.clone();
                            view! {
                                // mousedown fires before the input blurs and hides the list.
                                <div
                                    style="display: flex; align-items: center; justify-content: space-between; padding: 7px 12px; cursor: pointer; color: #e2e0d8; font-size: 0.85rem;"
                                    on:mousedown=move |ev| {
                                        ev.prevent_default();
                                        submit(pick.clone());
                                    }
                                >
                                    <span>{term}</span>
                                    <span
                                        title="Remove"
                                        style="color: #5a5860; padding: 0 4px;"
                                        on:mousedown=move |ev| {
                                            ev.prevent_default();
                                            ev.stop_propagation();
                                            dashboard.history.update(|history| history.remove(&forget));
                                        }
                                    >"\u{00D7}"</span>
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        </div>
    }
}

/// Recent searches on the landing page.
#[component]
pub fn RecentSearches() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let CurrentRoute(route) = expect_context::<CurrentRoute>();
    let terms = history_terms(dashboard);

    view! {
        <Show
            when=move || !terms.with(Vec::is_empty)
            fallback=|| view! { <p style="color: #5a5860; font-size: 0.85rem;">"No recent searches yet."</p> }
        >
            <h2 style="font-family: 'Silkscreen', monospace; font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.14em; color: #5a5860; margin: 0 0 8px;">"Recent searches"</h2>
            <div style="display: flex; flex-wrap: wrap; gap: 8px;">
                <For
                    each=move || terms.get()
                    key=|term| term.clone()
                    children=move |term| {
                        let open = term.clone();
                        let forget = term.clone();
                        view! {
                            <span style="display: inline-flex; align-items: center; gap: 6px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 4px; padding: 4px 8px; font-size: 0.85rem;">
                                <span
                                    style="cursor: pointer; color: #e2e0d8;"
                                    on:click=move |_| navigate(route, Route::Player(open.clone()))
                                >{term}</span>
                                <span
                                    title="Remove"
                                    style="cursor: pointer; color: #5a5860;"
                                    on:click=move |_| dashboard.history.update(|history| history.remove(&forget))
                                >"\u{00D7}"</span>
                            </span>
                        }
                    }
                />
            </div>
        </Show>
    }
}

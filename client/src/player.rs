use aspexis_shared::format::compact_number;
use aspexis_shared::metric::{
    DONUT_BLOCKS_BROKEN, DONUT_BLOCKS_PLACED, DONUT_DEATHS, DONUT_HOURS_PLAYED, DONUT_KILLS,
    DONUT_MONEY, DONUT_MONEY_EARNED, DONUT_MONEY_SPENT, DONUT_SHARDS, HYPIXEL_ACHIEVEMENT_POINTS,
    HYPIXEL_KARMA, HYPIXEL_LEVEL, WYNNCRAFT_CHESTS_OPENED, WYNNCRAFT_DUNGEONS_COMPLETED,
    WYNNCRAFT_HOURS_PLAYED, WYNNCRAFT_MOBS_KILLED, WYNNCRAFT_RAIDS_COMPLETED, WYNNCRAFT_WARS,
};
use aspexis_shared::player::PlayerIdentity;
use aspexis_shared::services::{HypixelProfile, WynncraftCharacter, WynncraftProfile};
use aspexis_shared::{AbilityClass, FetchError, QueryState, ServiceSection, ServiceTab};
use leptos::prelude::*;
use serde_json::{Map, Value};

use crate::dashboard::Dashboard;
use crate::distribution::{MetricButton, MetricPanel};

type Stats = Map<String, Value>;

/// Metric key and the backend field holding the player's value.
const WYNNCRAFT_STATS: [(&str, &str); 6] = [
    (WYNNCRAFT_HOURS_PLAYED, "playtime_hours"),
    (WYNNCRAFT_WARS, "wars"),
    (WYNNCRAFT_MOBS_KILLED, "mobs_killed"),
    (WYNNCRAFT_CHESTS_OPENED, "chests_opened"),
    (WYNNCRAFT_DUNGEONS_COMPLETED, "dungeons_completed"),
    (WYNNCRAFT_RAIDS_COMPLETED, "raids_completed"),
];

const DONUT_STATS: [(&str, &str); 9] = [
    (DONUT_HOURS_PLAYED, "playtime_hours"),
    (DONUT_KILLS, "kills"),
    (DONUT_DEATHS, "deaths"),
    (DONUT_MONEY, "money"),
    (DONUT_MONEY_SPENT, "money_spent"),
    (DONUT_MONEY_EARNED, "money_earned"),
    (DONUT_SHARDS, "shards"),
    (DONUT_BLOCKS_PLACED, "placed_blocks"),
    (DONUT_BLOCKS_BROKEN, "broken_blocks"),
];

/// Numeric stat as display text; missing or non-numeric values render as "-".
pub(crate) fn stat_text(stats: Option<&Stats>, field: &str) -> String {
    stats
        .and_then(|stats| stats.get(field))
        .and_then(Value::as_f64)
        .map(compact_number)
        .unwrap_or_else(|| "-".to_string())
}

/// Top-level scalar fields, sorted by key, for services without a fixed layout.
pub(crate) fn scalar_entries(stats: &Stats) -> Vec<(String, String)> {
    let mut entries: Vec<_> = stats
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Number(n) => n.as_f64().map(compact_number)?,
                Value::String(s) => s.clone(),
                Value::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
                _ => return None,
            };
            Some((key.replace('_', " "), text))
        })
        .collect();
    entries.sort();
    entries
}

fn optional_number(value: Option<f64>) -> String {
    value.map(compact_number).unwrap_or_else(|| "-".to_string())
}

const CARD: &str = "padding: 14px 16px; background: #13161f; border: 1px solid #282c3e; border-radius: 8px; margin-top: 12px;";
const HEADING: &str = "font-family: 'Silkscreen', monospace; font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.14em; color: #5a5860; margin: 0 0 8px;";
const MUTED: &str = "color: #9a9590; font-size: 0.85rem;";
const ERROR: &str = "color: #e06c5a; font-size: 0.85rem;";
const BUTTON: &str = "padding: 5px 10px; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 4px; color: #e2e0d8; cursor: pointer; font-size: 0.8rem;";

#[component]
pub fn PlayerPage() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let term = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.term().map(str::to_owned).unwrap_or_default())
    });
    let identity = Memo::new(move |_| dashboard.session.with(|session| session.identity().cloned()));

    move || match identity.get() {
        QueryState::Idle | QueryState::Pending => view! {
            <p style=MUTED>{move || format!("Looking up {}...", term.get())}</p>
        }
        .into_any(),
        QueryState::NotFound => view! {
            <p style=MUTED>{move || format!("No player found for \"{}\".", term.get())}</p>
        }
        .into_any(),
        QueryState::Error(e) => view! {
            <div>
                <p style=ERROR>{format!("Could not resolve player: {e}")}</p>
                <button style=BUTTON on:click=move |_| dashboard.refresh(ServiceSection::Identity)>"Retry"</button>
            </div>
        }
        .into_any(),
        QueryState::Success(identity) => view! {
            <PlayerHeader identity=identity />
            <StatusLine />
            <FailedSections />
            <ServiceTabs />
            <MetricPanel />
        }
        .into_any(),
    }
}

#[component]
fn PlayerHeader(identity: PlayerIdentity) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    dashboard.reload_favorites();
    let uuid = identity.uuid.clone();
    let is_favorite = Memo::new({
        let uuid = uuid.clone();
        move |_| dashboard.favorites.with(|favorites| favorites.contains(&uuid))
    });
    let toggle = {
        let uuid = uuid.clone();
        let username = identity.username.clone();
        move |_| {
            dashboard.favorites.update(|favorites| {
                if !favorites.remove(&uuid) {
                    favorites.add(&uuid, &username, chrono::Utc::now());
                }
            });
        }
    };

    view! {
        <div style="display: flex; align-items: center; gap: 16px;">
            {identity.skin_data_uri().map(|src| view! {
                <img src=src alt="skin" style="width: 64px; height: 64px; image-rendering: pixelated;" />
            })}
            <div style="flex: 1;">
                <div style="font-size: 1.5rem; font-weight: 700; color: #e2e0d8;">{identity.username.clone()}</div>
                <div style="font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; color: #5a5860;">{uuid}</div>
            </div>
            <button
                title={move || if is_favorite.get() { "Remove from favorites" } else { "Add to favorites" }}
                style={move || format!("{BUTTON} color: {};", if is_favorite.get() { "#f5c542" } else { "#9a9590" })}
                on:click=toggle
            >
                {move || if is_favorite.get() { "\u{2605} Favorited" } else { "\u{2606} Favorite" }}
            </button>
        </div>
    }
}

#[component]
fn StatusLine() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let status = Memo::new(move |_| dashboard.session.with(|session| session.status().cloned()));
    let capes = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.capes().data().map(|capes| (*capes).clone()).unwrap_or_default())
    });

    let status_text = move || match status.get() {
        QueryState::Success(status) => match status.location() {
            Some(location) => format!("Online on {location}"),
            None if status.wynncraft_restricted => "Offline (Wynncraft status hidden)".to_string(),
            None => "Offline".to_string(),
        },
        QueryState::Pending => "Checking status...".to_string(),
        _ => String::new(),
    };
    let online = move || status.with(|state| state.data().is_some_and(|s| s.is_online()));

    view! {
        <div style="display: flex; flex-wrap: wrap; align-items: center; gap: 12px; margin-top: 10px; font-size: 0.85rem;">
            <span style={move || format!("color: {};", if online() { "#6cc070" } else { "#9a9590" })}>{status_text}</span>
            <For
                each={move || capes.get().into_iter().enumerate().collect::<Vec<_>>()}
                key=|(i, cape)| (*i, cape.name.clone())
                children=move |(_, cape)| {
                    let label = match (cape.provider, cape.name) {
                        (Some(provider), Some(name)) => format!("{name} ({provider})"),
                        (None, Some(name)) => name,
                        (Some(provider), None) => provider,
                        (None, None) => "Cape".to_string(),
                    };
                    view! {
                        <span style="background: #1a1d2a; border: 1px solid #282c3e; border-radius: 3px; padding: 1px 6px; color: #e2e0d8; font-size: 0.75rem;">{label}</span>
                    }
                }
            />
        </div>
    }
}

/// Failed sections with a retry each; the rest of the dashboard stays usable.
#[component]
fn FailedSections() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let failed = Memo::new(move |_| {
        dashboard.session.with(|session| {
            session
                .failed_sections()
                .into_iter()
                .filter(|(section, error)| {
                    *section != ServiceSection::Identity && error.is_server_error()
                })
                .collect::<Vec<(ServiceSection, FetchError)>>()
        })
    });

    view! {
        <For
            each=move || failed.get()
            key=|(section, error)| (section.label(), error.to_string())
            children=move |(section, error)| {
                let retry = move |_| match section {
                    ServiceSection::HypixelGuild => dashboard.load_more_guild_members(),
                    other => dashboard.refresh(other),
                };
                view! {
                    <div style="display: flex; align-items: center; gap: 10px; margin-top: 8px; padding: 6px 10px; border: 1px solid rgba(224,108,90,0.4); border-radius: 6px;">
                        <span style=ERROR>{format!("{}: {error}", section.label())}</span>
                        <button style=BUTTON on:click=retry>"Retry"</button>
                    </div>
                }
            }
        />
    }
}

#[component]
fn ServiceTabs() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let loaded = Memo::new(move |_| dashboard.session.with(|session| session.loaded_tabs()));
    let selected = Memo::new(move |_| dashboard.session.with(|session| session.selected_tab()));
    let loading = Memo::new(move |_| dashboard.session.with(|session| session.is_loading_services()));

    let panel = move || match selected.get() {
        Some(ServiceTab::Hypixel) => view! { <HypixelPanel /> }.into_any(),
        Some(ServiceTab::Wynncraft) => view! { <WynncraftPanel /> }.into_any(),
        Some(ServiceTab::DonutSmp) => view! { <DonutPanel /> }.into_any(),
        Some(ServiceTab::MccIsland) => view! { <MccIslandPanel /> }.into_any(),
        None if loading.get() => view! { <p style=MUTED>"Loading game services..."</p> }.into_any(),
        None => view! { <p style=MUTED>"No game data found for this player."</p> }.into_any(),
    };

    view! {
        <nav style="display: flex; gap: 4px; margin-top: 20px; border-bottom: 1px solid #282c3e;">
            <For
                each=move || loaded.get()
                key=|tab| *tab
                children=move |tab| {
                    let active = move || selected.get() == Some(tab);
                    view! {
                        <span
                            style={move || format!(
                                "padding: 8px 14px; cursor: pointer; font-size: 0.85rem; border-bottom: 2px solid {}; color: {};",
                                if active() { "#f5c542" } else { "transparent" },
                                if active() { "#e2e0d8" } else { "#9a9590" },
                            )}
                            on:click=move |_| dashboard.select_tab(tab)
                        >{tab.label()}</span>
                    }
                }
            />
        </nav>
        <div style="padding-top: 8px;">{panel}</div>
    }
}

#[component]
fn HypixelPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let profile = Memo::new(move |_| dashboard.session.with(|session| session.hypixel().data().cloned().cloned()));

    move || {
        profile.get().map(|profile: HypixelProfile| {
            let player = &profile.player;
            let guild = profile.guild.clone();
            view! {
                <div style="display: flex; flex-wrap: wrap; gap: 8px;">
                    <MetricButton metric_key=HYPIXEL_LEVEL value=optional_number(player.network_level) />
                    <MetricButton metric_key=HYPIXEL_KARMA value=optional_number(player.karma.map(|v| v as f64)) />
                    <MetricButton
                        metric_key=HYPIXEL_ACHIEVEMENT_POINTS
                        value=optional_number(player.achievement_points.map(|v| v as f64))
                    />
                </div>
                {guild.map(|guild| view! {
                    <div style=CARD>
                        <h3 style=HEADING>"Guild"</h3>
                        <div style="color: #e2e0d8; font-weight: 600;">
                            {guild.name.clone()}
                            {guild.tag.clone().map(|tag| format!(" [{tag}]"))}
                        </div>
                        <div style=MUTED>{format!("Level {}", optional_number(guild.level))}</div>
                        <GuildRosterList />
                    </div>
                })}
            }
        })
    }
}

#[component]
fn GuildRosterList() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let members = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.guild_roster().members().to_vec())
    });
    let has_next = Memo::new(move |_| dashboard.session.with(|session| session.guild_roster().has_next_page()));
    let fetching = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.guild_roster().is_fetching_next_page())
    });
    let error = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.guild_roster().error().map(ToString::to_string))
    });

    view! {
        <div style="margin-top: 10px; display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 6px;">
            <For
                each=move || members.get()
                key=|member| member.uuid.clone()
                children=move |member| view! {
                    <div style="display: flex; align-items: center; gap: 6px; font-size: 0.8rem;">
                        {member.skin_showcase_b64.clone().map(|b64| view! {
                            <img src=format!("data:image/png;base64,{b64}") alt="" style="width: 20px; height: 20px; image-rendering: pixelated;" />
                        })}
                        <span style="color: #e2e0d8;">{member.username.clone()}</span>
                        <span style="color: #5a5860;">{member.rank.clone().unwrap_or_default()}</span>
                    </div>
                }
            />
        </div>
        <div style="margin-top: 10px; display: flex; align-items: center; gap: 10px;">
            <span style=MUTED>{move || format!("{} members loaded", members.with(Vec::len))}</span>
            {move || match error.get() {
                Some(e) => view! {
                    <span style=ERROR>{e}</span>
                    <button style=BUTTON on:click=move |_| dashboard.load_more_guild_members()>"Retry"</button>
                }
                .into_any(),
                None if fetching.get() => view! { <span style=MUTED>"Loading..."</span> }.into_any(),
                None if has_next.get() => view! {
                    <button style=BUTTON on:click=move |_| dashboard.load_more_guild_members()>"Load more"</button>
                }
                .into_any(),
                None => view! { <span style="display: none;" /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn WynncraftPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let profile = Memo::new(move |_| dashboard.session.with(|session| session.wynncraft().data().cloned().cloned()));

    move || {
        profile.get().map(|profile: WynncraftProfile| {
            let stats = profile
                .extra
                .get("player_stats")
                .and_then(Value::as_object)
                .cloned();
            let buttons = WYNNCRAFT_STATS
                .iter()
                .map(|&(metric_key, field)| {
                    view! { <MetricButton metric_key=metric_key value=stat_text(stats.as_ref(), field) /> }
                })
                .collect_view();
            let characters = profile
                .characters
                .iter()
                .cloned()
                .map(|character| view! { <CharacterRow character=character /> })
                .collect_view();
            view! {
                <div style=MUTED>
                    {profile.rank.clone().unwrap_or_else(|| "Player".to_string())}
                    {if profile.online { " \u{00B7} online" } else { "" }}
                </div>
                <div style="display: flex; flex-wrap: wrap; gap: 8px; margin-top: 8px;">{buttons}</div>
                <div style=CARD>
                    <h3 style=HEADING>"Characters"</h3>
                    {characters}
                    <AbilityTreeSummary />
                </div>
                <WynncraftGuildCard />
            }
        })
    }
}

#[component]
fn CharacterRow(character: WynncraftCharacter) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let class = AbilityClass::parse(&character.character_class);
    let name = character
        .nickname
        .clone()
        .unwrap_or_else(|| character.character_class.clone());
    let character_uuid = character.character_uuid.clone();

    view! {
        <div style="display: flex; align-items: center; justify-content: space-between; padding: 4px 0; font-size: 0.85rem;">
            <span style="color: #e2e0d8;">{format!("{name} \u{00B7} Lv. {}", character.level)}</span>
            {class.map(|class| view! {
                <button
                    style=BUTTON
                    on:click=move |_| dashboard.select_ability_tree(&character_uuid, class)
                >"Ability tree"</button>
            })}
        </div>
    }
}

#[component]
fn AbilityTreeSummary() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let tree = Memo::new(move |_| dashboard.session.with(|session| session.ability_tree().cloned()));

    move || match tree.get() {
        QueryState::Idle => view! { <span style="display: none;" /> }.into_any(),
        QueryState::Pending => view! { <p style=MUTED>"Loading ability tree..."</p> }.into_any(),
        QueryState::NotFound => view! { <p style=MUTED>"No ability tree for this character."</p> }.into_any(),
        QueryState::Error(e) => view! { <p style=ERROR>{format!("Ability tree unavailable: {e}")}</p> }.into_any(),
        QueryState::Success(pages) => {
            let nodes: usize = pages.iter().map(|page| page.nodes.len()).sum();
            view! {
                <p style=MUTED>{format!("Ability tree: {} pages, {nodes} nodes", pages.len())}</p>
            }
            .into_any()
        }
    }
}

#[component]
fn WynncraftGuildCard() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let guild = Memo::new(move |_| dashboard.session.with(|session| session.wynncraft_guild().cloned()));

    move || match guild.get() {
        QueryState::Success(guild) => {
            let members = guild
                .members
                .iter()
                .map(|member| {
                    let color = if member.online { "#6cc070" } else { "#e2e0d8" };
                    view! {
                        <span style={format!("font-size: 0.8rem; color: {color};")}>{member.username.clone()}</span>
                    }
                })
                .collect_view();
            view! {
                <div style=CARD>
                    <h3 style=HEADING>"Guild"</h3>
                    <div style="color: #e2e0d8; font-weight: 600;">{format!("{} [{}]", guild.name, guild.prefix)}</div>
                    <div style=MUTED>
                        {format!(
                            "Level {} \u{00B7} {} wars \u{00B7} {} territories \u{00B7} {} members",
                            guild.level,
                            compact_number(guild.wars as f64),
                            guild.territories,
                            guild.member_count,
                        )}
                    </div>
                    <div style="display: flex; flex-wrap: wrap; gap: 6px 12px; margin-top: 8px;">{members}</div>
                </div>
            }
            .into_any()
        }
        QueryState::Pending => view! { <p style=MUTED>"Loading guild..."</p> }.into_any(),
        _ => view! { <span style="display: none;" /> }.into_any(),
    }
}

#[component]
fn DonutPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let stats = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.donut().data().map(|profile| profile.stats.clone()))
    });

    move || {
        stats.get().map(|stats| {
            let online = stats.get("online").and_then(Value::as_bool).unwrap_or(false);
            let buttons = DONUT_STATS
                .iter()
                .map(|&(metric_key, field)| {
                    view! { <MetricButton metric_key=metric_key value=stat_text(Some(&stats), field) /> }
                })
                .collect_view();
            view! {
                <div style=MUTED>{if online { "Online" } else { "Offline" }}</div>
                <div style="display: flex; flex-wrap: wrap; gap: 8px; margin-top: 8px;">{buttons}</div>
            }
        })
    }
}

#[component]
fn MccIslandPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let entries = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.mcc_island().data().map(|profile| scalar_entries(&profile.extra)))
            .unwrap_or_default()
    });

    view! {
        <div style="display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 6px 16px;">
            <For
                each=move || entries.get()
                key=|(label, _)| label.clone()
                children=|(label, value)| view! {
                    <div style="display: flex; justify-content: space-between; font-size: 0.85rem; padding: 3px 0; border-bottom: 1px solid rgba(40,44,62,0.5);">
                        <span style="color: #9a9590; text-transform: capitalize;">{label}</span>
                        <span style="color: #e2e0d8; font-family: 'JetBrains Mono', monospace;">{value}</span>
                    </div>
                }
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn stats(value: Value) -> Stats {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn stat_text_formats_numbers_and_marks_gaps() {
        let stats = stats(json!({"kills": 1234, "money": "lots"}));
        assert_eq!(stat_text(Some(&stats), "kills"), "1.2K");
        assert_eq!(stat_text(Some(&stats), "money"), "-");
        assert_eq!(stat_text(Some(&stats), "deaths"), "-");
        assert_eq!(stat_text(None, "kills"), "-");
    }

    #[test]
    fn scalar_entries_skip_nested_values() {
        let stats = stats(json!({
            "trophies": 5400,
            "rank": "CHAMP",
            "plus": true,
            "badges": ["a"],
            "crown": {"level": 3}
        }));
        assert_eq!(
            scalar_entries(&stats),
            vec![
                ("plus".to_string(), "yes".to_string()),
                ("rank".to_string(), "CHAMP".to_string()),
                ("trophies".to_string(), "5.4K".to_string()),
            ]
        );
    }

    #[test]
    fn every_stat_field_maps_to_a_known_metric() {
        for (metric_key, _) in WYNNCRAFT_STATS.iter().chain(DONUT_STATS.iter()) {
            assert!(aspexis_shared::metric::KNOWN_METRICS.contains(metric_key));
        }
    }
}

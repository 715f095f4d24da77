use aspexis_shared::QueryState;
use aspexis_shared::format::compact_number;
use aspexis_shared::metric::MetricDistribution;
use leptos::prelude::*;

use crate::dashboard::Dashboard;

/// Bar heights as a percentage of the tallest bucket.
pub(crate) fn bar_heights(counts: &[u64]) -> Vec<f64> {
    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .iter()
        .map(|&count| count as f64 / max as f64 * 100.0)
        .collect()
}

/// "Top 38.7%" style label; `percentile` is the share of players ranked below.
pub(crate) fn percentile_label(percentile: f64, higher_is_better: bool) -> String {
    let p = percentile.clamp(0.0, 100.0);
    let top = if higher_is_better { 100.0 - p } else { p };
    let rounded = (top * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("Top {rounded:.0}%")
    } else {
        format!("Top {rounded:.1}%")
    }
}

/// "donut_money_spent" -> "Money Spent".
pub(crate) fn metric_label(metric_key: &str) -> String {
    let stem = ["hypixel_", "wynncraft_", "donut_"]
        .iter()
        .find_map(|prefix| metric_key.strip_prefix(prefix))
        .unwrap_or(metric_key);
    stem.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[component]
pub fn MetricButton(metric_key: &'static str, value: String) -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let active = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.selected_metric() == Some(metric_key))
    });
    let border = move || if active.get() { "#f5c542" } else { "#282c3e" };

    view! {
        <button
            style={move || format!("display: flex; flex-direction: column; align-items: flex-start; gap: 2px; padding: 8px 10px; background: #1a1d2a; border: 1px solid {}; border-radius: 6px; cursor: pointer; color: #e2e0d8; min-width: 120px;", border())}
            on:click=move |_| dashboard.select_metric(metric_key)
        >
            <span style="font-size: 0.65rem; text-transform: uppercase; letter-spacing: 0.1em; color: #9a9590;">{metric_label(metric_key)}</span>
            <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.95rem;">{value}</span>
        </button>
    }
}

#[component]
pub fn MetricPanel() -> impl IntoView {
    let dashboard = expect_context::<Dashboard>();
    let selected = Memo::new(move |_| {
        dashboard
            .session
            .with(|session| session.selected_metric().map(str::to_owned))
    });
    let state = Memo::new(move |_| dashboard.session.with(|session| session.metric().cloned()));

    let body = move || match state.get() {
        QueryState::Idle => view! { <span style="display: none;" /> }.into_any(),
        QueryState::Pending => view! {
            <p style="color: #9a9590; font-size: 0.85rem;">"Loading distribution..."</p>
        }
        .into_any(),
        QueryState::NotFound => view! {
            <p style="color: #9a9590; font-size: 0.85rem;">"No distribution data for this stat yet."</p>
        }
        .into_any(),
        QueryState::Error(e) => view! {
            <p style="color: #e06c5a; font-size: 0.85rem;">{format!("Could not load distribution: {e}")}</p>
        }
        .into_any(),
        QueryState::Success(dist) => view! { <Histogram dist=dist /> }.into_any(),
    };

    view! {
        <Show when=move || selected.with(Option::is_some)>
            <section style="margin-top: 16px; padding: 14px 16px; background: #13161f; border: 1px solid #282c3e; border-radius: 8px;">
                <div style="display: flex; align-items: center; justify-content: space-between; margin-bottom: 10px;">
                    <span style="font-family: 'Silkscreen', monospace; font-size: 0.8rem; letter-spacing: 0.12em; color: #f5c542;">
                        {move || selected.get().map(|key| metric_label(&key)).unwrap_or_default()}
                    </span>
                    <span
                        title="Close"
                        style="cursor: pointer; color: #5a5860;"
                        on:click=move |_| dashboard.clear_metric()
                    >"\u{00D7}"</span>
                </div>
                {body}
            </section>
        </Show>
    }
}

#[component]
fn Histogram(dist: MetricDistribution) -> impl IntoView {
    let highlighted = dist.player_bucket();
    let heights = bar_heights(&dist.counts);
    let unit = dist.unit.clone().unwrap_or_default();
    let bars = heights
        .into_iter()
        .enumerate()
        .map(|(i, height)| {
            let color = if Some(i) == highlighted { "#f5c542" } else { "#3a3f5c" };
            let count = dist.counts.get(i).copied().unwrap_or(0);
            let range = match (dist.buckets.get(i), dist.buckets.get(i + 1)) {
                (Some(lo), Some(hi)) => format!("{} - {}: {count}", compact_number(*lo), compact_number(*hi)),
                _ => count.to_string(),
            };
            view! {
                <div
                    title=range
                    style={format!("flex: 1; min-width: 2px; height: {height:.1}%; background: {color}; border-radius: 2px 2px 0 0;")}
                />
            }
        })
        .collect_view();

    let top_players = dist
        .top_players
        .iter()
        .enumerate()
        .map(|(i, ranked)| {
            let short = ranked.uuid.chars().take(8).collect::<String>();
            view! {
                <li style="display: flex; justify-content: space-between; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; color: #9a9590; padding: 2px 0;">
                    <span>{format!("#{} {short}", i + 1)}</span>
                    <span style="color: #e2e0d8;">{compact_number(ranked.value)}</span>
                </li>
            }
        })
        .collect_view();

    view! {
        <div style="display: flex; align-items: flex-end; gap: 2px; height: 120px; padding-bottom: 4px; border-bottom: 1px solid #282c3e;">
            {bars}
        </div>
        <div style="display: flex; flex-wrap: wrap; gap: 16px; margin-top: 10px; font-size: 0.85rem;">
            <span style="color: #f5c542; font-weight: 600;">{percentile_label(dist.percentile, dist.higher_is_better)}</span>
            <span style="color: #e2e0d8;">{format!("{} {unit}", compact_number(dist.player_value)).trim_end().to_string()}</span>
            <span style="color: #9a9590;">{format!("Rank #{} of {}", dist.player_rank, dist.sample_size)}</span>
        </div>
        {(!dist.top_players.is_empty()).then(|| view! {
            <div style="margin-top: 12px;">
                <div style="font-size: 0.65rem; text-transform: uppercase; letter-spacing: 0.12em; color: #5a5860; margin-bottom: 4px;">"Top players"</div>
                <ol style="list-style: none; margin: 0; padding: 0;">{top_players}</ol>
            </div>
        })}
    }
}

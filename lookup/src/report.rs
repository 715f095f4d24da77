use aspexis_shared::format::{compact_number, relative_age};
use aspexis_shared::metric::MetricDistribution;
use aspexis_shared::player::PlayerIdentity;
use aspexis_shared::services::{DonutProfile, HypixelProfile, WynncraftGuild, WynncraftProfile};
use aspexis_shared::{Favorite, PlayerSession, QueryState, ServiceTab};
use chrono::{DateTime, Utc};

/// Plain-text dashboard for a finished lookup.
pub fn render_session(session: &PlayerSession) -> String {
    let term = session.term().unwrap_or_default();
    let identity = match session.identity() {
        QueryState::Success(identity) => identity,
        QueryState::NotFound => return format!("No player found for \"{term}\".\n"),
        QueryState::Error(e) => return format!("Could not look up \"{term}\": {e}\n"),
        QueryState::Idle | QueryState::Pending => return format!("Lookup for \"{term}\" did not finish.\n"),
    };

    let mut lines = vec![format!("{} ({})", identity.username, identity.uuid)];
    if let Some(status) = session.status().data() {
        lines.push(match status.location() {
            Some(location) => format!("Online: {location}"),
            None => "Offline".to_string(),
        });
    }
    if let Some(capes) = session.capes().data()
        && !capes.is_empty()
    {
        let names: Vec<&str> = capes.iter().filter_map(|c| c.name.as_deref()).collect();
        lines.push(format!("Capes: {}", names.join(", ")));
    }

    let tabs = session.loaded_tabs();
    if tabs.is_empty() {
        lines.push("No service profiles found.".to_string());
    }
    for tab in tabs {
        lines.push(String::new());
        let marker = if session.selected_tab() == Some(tab) { "*" } else { " " };
        lines.push(format!("{marker}[{}]", tab.label()));
        match tab {
            ServiceTab::Hypixel => {
                if let Some(profile) = session.hypixel().data() {
                    hypixel_lines(&mut lines, profile, session);
                }
            }
            ServiceTab::Wynncraft => {
                if let Some(profile) = session.wynncraft().data() {
                    wynncraft_lines(&mut lines, profile, session.wynncraft_guild().data().copied());
                }
            }
            ServiceTab::DonutSmp => {
                if let Some(profile) = session.donut().data() {
                    donut_lines(&mut lines, profile);
                }
            }
            ServiceTab::MccIsland => lines.push("  Profile found".to_string()),
        }
    }

    if let Some(key) = session.selected_metric() {
        lines.push(String::new());
        lines.push(match session.metric() {
            QueryState::Success(dist) => metric_line(key, dist),
            QueryState::NotFound => format!("{key}: no distribution data"),
            QueryState::Error(e) => format!("{key}: {e}"),
            QueryState::Idle | QueryState::Pending => format!("{key}: not loaded"),
        });
    }

    let failed = session.failed_sections();
    if !failed.is_empty() {
        lines.push(String::new());
        for (section, error) in failed {
            lines.push(format!("! {}: {error}", section.label()));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

fn hypixel_lines(lines: &mut Vec<String>, profile: &HypixelProfile, session: &PlayerSession) {
    let player = &profile.player;
    if let Some(level) = player.network_level {
        lines.push(format!("  Network level {}", compact_number(level)));
    }
    if let Some(karma) = player.karma {
        lines.push(format!("  Karma {}", compact_number(karma as f64)));
    }
    if let Some(points) = player.achievement_points {
        lines.push(format!("  Achievement points {}", compact_number(points as f64)));
    }
    let Some(guild) = &profile.guild else {
        return;
    };
    let tag = guild.tag.as_deref().map(|t| format!(" [{t}]")).unwrap_or_default();
    let roster = session.guild_roster();
    let more = if roster.has_next_page() { ", more available" } else { "" };
    lines.push(format!(
        "  Guild {}{tag}: {} members loaded{more}",
        guild.name,
        roster.members().len()
    ));
    for member in roster.members() {
        let rank = member.rank.as_deref().unwrap_or("Member");
        lines.push(format!("    {} ({rank})", member.username));
    }
}

fn wynncraft_lines(lines: &mut Vec<String>, profile: &WynncraftProfile, guild: Option<&WynncraftGuild>) {
    if let Some(rank) = &profile.rank {
        lines.push(format!("  Rank {rank}"));
    }
    for character in &profile.characters {
        let name = character.nickname.as_deref().unwrap_or(&character.character_class);
        lines.push(format!("  {name}: level {} {}", character.level, character.character_class));
    }
    if let Some(guild) = guild {
        lines.push(format!(
            "  Guild {} [{}]: level {}, {} members, {} territories",
            guild.name, guild.prefix, guild.level, guild.member_count, guild.territories
        ));
    }
}

fn donut_lines(lines: &mut Vec<String>, profile: &DonutProfile) {
    let mut stats: Vec<_> = profile
        .stats
        .iter()
        .filter_map(|(key, value)| value.as_f64().map(|n| (key, n)))
        .collect();
    stats.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in stats {
        lines.push(format!("  {key}: {}", compact_number(value)));
    }
}

fn metric_line(key: &str, dist: &MetricDistribution) -> String {
    let unit = dist.unit.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
    format!(
        "{key}: {}{unit}, percentile {:.1} (rank {} of {})",
        compact_number(dist.player_value),
        dist.percentile,
        dist.player_rank,
        dist.sample_size
    )
}

pub fn render_history(terms: &[String]) -> String {
    if terms.is_empty() {
        return "No recent searches.\n".to_string();
    }
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        out.push_str(&format!("{}. {term}\n", i + 1));
    }
    out
}

pub fn render_favorites(
    favorites: &[(Favorite, QueryState<PlayerIdentity>)],
    now: DateTime<Utc>,
) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }
    let mut out = String::new();
    for (favorite, identity) in favorites {
        let name = identity
            .data()
            .map(|identity| identity.username.as_str())
            .unwrap_or(&favorite.username);
        out.push_str(&format!(
            "{name} ({}), added {}\n",
            favorite.uuid,
            relative_age(favorite.added_on, now)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn favorites_prefer_current_username() {
        let now = Utc::now();
        let favorite = Favorite {
            uuid: "u1".into(),
            username: "OldName".into(),
            added_on: now - TimeDelta::days(2),
        };
        let renamed = PlayerIdentity {
            uuid: "u1".into(),
            username: "NewName".into(),
            skin_image_base64: None,
        };
        let out = render_favorites(
            &[
                (favorite.clone(), QueryState::Success(renamed)),
                (favorite, QueryState::NotFound),
            ],
            now,
        );
        assert_eq!(
            out,
            "NewName (u1), added 2 days ago\nOldName (u1), added 2 days ago\n"
        );
    }

    #[test]
    fn history_is_numbered_newest_first() {
        assert_eq!(
            render_history(&["jeb_".into(), "Notch".into()]),
            "1. jeb_\n2. Notch\n"
        );
        assert_eq!(render_history(&[]), "No recent searches.\n");
    }

    #[test]
    fn unsearched_session_reports_unfinished() {
        assert_eq!(
            render_session(&PlayerSession::new()),
            "Lookup for \"\" did not finish.\n"
        );
    }
}

use serde::{Deserialize, Serialize};

use crate::cache::QueryCache;
use crate::query::{QueryKey, QueryState};

pub const HYPIXEL_LEVEL: &str = "hypixel_level";
pub const HYPIXEL_KARMA: &str = "hypixel_karma";
pub const HYPIXEL_ACHIEVEMENT_POINTS: &str = "hypixel_achievement_points";

pub const WYNNCRAFT_HOURS_PLAYED: &str = "wynncraft_hours_played";
pub const WYNNCRAFT_WARS: &str = "wynncraft_wars";
pub const WYNNCRAFT_MOBS_KILLED: &str = "wynncraft_mobs_killed";
pub const WYNNCRAFT_CHESTS_OPENED: &str = "wynncraft_chests_opened";
pub const WYNNCRAFT_DUNGEONS_COMPLETED: &str = "wynncraft_dungeons_completed";
pub const WYNNCRAFT_RAIDS_COMPLETED: &str = "wynncraft_raids_completed";

pub const DONUT_HOURS_PLAYED: &str = "donut_hours_played";
pub const DONUT_KILLS: &str = "donut_kills";
pub const DONUT_DEATHS: &str = "donut_deaths";
pub const DONUT_MONEY: &str = "donut_money";
pub const DONUT_MONEY_SPENT: &str = "donut_money_spent";
pub const DONUT_MONEY_EARNED: &str = "donut_money_earned";
pub const DONUT_SHARDS: &str = "donut_shards";
pub const DONUT_BLOCKS_PLACED: &str = "donut_blocks_placed";
pub const DONUT_BLOCKS_BROKEN: &str = "donut_blocks_broken";

/// Every metric key a dashboard can select.
pub const KNOWN_METRICS: &[&str] = &[
    HYPIXEL_LEVEL,
    HYPIXEL_KARMA,
    HYPIXEL_ACHIEVEMENT_POINTS,
    WYNNCRAFT_HOURS_PLAYED,
    WYNNCRAFT_WARS,
    WYNNCRAFT_MOBS_KILLED,
    WYNNCRAFT_CHESTS_OPENED,
    WYNNCRAFT_DUNGEONS_COMPLETED,
    WYNNCRAFT_RAIDS_COMPLETED,
    DONUT_HOURS_PLAYED,
    DONUT_KILLS,
    DONUT_DEATHS,
    DONUT_MONEY,
    DONUT_MONEY_SPENT,
    DONUT_MONEY_EARNED,
    DONUT_SHARDS,
    DONUT_BLOCKS_PLACED,
    DONUT_BLOCKS_BROKEN,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub uuid: String,
    pub value: f64,
}

/// Histogram and percentile data for one `(metric, player)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDistribution {
    #[serde(default)]
    pub metric_key: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_higher_is_better")]
    pub higher_is_better: bool,
    /// Bucket edges; `counts[i]` covers `buckets[i]..buckets[i + 1]`.
    pub buckets: Vec<f64>,
    pub counts: Vec<u64>,
    pub player_value: f64,
    pub percentile: f64,
    pub sample_size: u64,
    #[serde(default)]
    pub top_players: Vec<RankedPlayer>,
    pub player_rank: u64,
}

fn default_higher_is_better() -> bool {
    true
}

impl MetricDistribution {
    pub fn is_consistent(&self) -> bool {
        !self.buckets.is_empty()
            && self.counts.len() == self.buckets.len() - 1
            && self.player_rank <= self.sample_size
    }

    /// Index of the bucket holding the player's value, if it falls inside the range.
    pub fn player_bucket(&self) -> Option<usize> {
        let last = self.counts.len().checked_sub(1)?;
        self.buckets.windows(2).position(|edge| {
            self.player_value >= edge[0] && self.player_value < edge[1]
        }).or_else(|| {
            // The top edge is inclusive.
            (self.buckets.last() == Some(&self.player_value)).then_some(last)
        })
    }
}

/// At most one metric selected per dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSelection {
    selected: Option<String>,
}

impl MetricSelection {
    pub fn select(&mut self, metric_key: impl Into<String>) {
        self.selected = Some(metric_key.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Cache key for the current selection, if one exists.
    pub fn key(&self, uuid: Option<&str>) -> Option<QueryKey> {
        Some(QueryKey::MetricDistribution {
            metric_key: self.selected.clone()?,
            uuid: uuid?.to_owned(),
        })
    }

    /// State of the selected metric only; results for earlier selections stay
    /// cached but are never returned under the new label.
    pub fn view<'a>(
        &self,
        cache: &'a QueryCache<QueryKey, MetricDistribution>,
        uuid: Option<&str>,
    ) -> QueryState<&'a MetricDistribution> {
        match self.key(uuid) {
            Some(key) => cache.state(&key),
            None => QueryState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricDistribution {
        serde_json::from_str(
            r#"{
                "metric_key": "hypixel_level",
                "unit": null,
                "higher_is_better": true,
                "player_value": 42.0,
                "sample_size": 1000,
                "min_value": 1.0,
                "max_value": 300.0,
                "buckets": [0.0, 50.0, 100.0, 300.0],
                "counts": [700, 250, 50],
                "percentile": 61.3,
                "top_players": [{"uuid": "u9", "value": 299.0}],
                "player_rank": 388
            }"#,
        )
        .expect("distribution payload should parse")
    }

    #[test]
    fn distribution_shape_is_consistent() {
        let dist = sample();
        assert!(dist.is_consistent());
        assert_eq!(dist.player_bucket(), Some(0));

        let broken = MetricDistribution {
            player_rank: 2000,
            ..dist
        };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn top_edge_is_inclusive() {
        let dist = MetricDistribution {
            player_value: 300.0,
            ..sample()
        };
        assert_eq!(dist.player_bucket(), Some(2));
    }

    #[test]
    fn view_never_shows_previous_selection() {
        let mut cache = QueryCache::new();
        let mut selection = MetricSelection::default();

        selection.select(HYPIXEL_LEVEL);
        let level_key = selection.key(Some("u1")).expect("key for selection");
        cache.begin(level_key.clone());
        cache.settle(&level_key, Ok(Some(sample())));
        assert!(selection.view(&cache, Some("u1")).is_success());

        selection.select(HYPIXEL_KARMA);
        assert_eq!(selection.view(&cache, Some("u1")), QueryState::Idle);
        assert!(cache.get(&level_key).is_some());
    }

    #[test]
    fn no_uuid_means_no_key() {
        let mut selection = MetricSelection::default();
        selection.select(DONUT_KILLS);
        assert_eq!(selection.key(None), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::query::QueryKey;

/// Members per Hypixel guild roster page.
pub const GUILD_PAGE_SIZE: usize = 20;

/// Wynncraft character class accepted by the ability-tree endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityClass {
    Warrior,
    Mage,
    Archer,
    Assassin,
    Shaman,
}

impl AbilityClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Archer => "archer",
            Self::Assassin => "assassin",
            Self::Shaman => "shaman",
        }
    }

    /// Parse a character class as reported by Wynncraft. Reskinned classes
    /// (knight, dark wizard, hunter, ninja, skyseer) map to their base class.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "warrior" | "knight" => Some(Self::Warrior),
            "mage" | "darkwizard" | "dark_wizard" => Some(Self::Mage),
            "archer" | "hunter" => Some(Self::Archer),
            "assassin" | "ninja" => Some(Self::Assassin),
            "shaman" | "skyseer" => Some(Self::Shaman),
            _ => None,
        }
    }
}

/// Deployment settings the static host hands to the browser at `/config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl ClientConfig {
    /// Configured backend base URL, or `origin` when none is set.
    pub fn base_url_or<'a>(&'a self, origin: &'a str) -> &'a str {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(origin)
    }
}

/// Backend route for one cache key, as unencoded path segments plus query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub segments: Vec<String>,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    fn with_query(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    pub fn for_key(key: &QueryKey) -> Self {
        match key {
            QueryKey::Identity(term) => Self::new(["v1", "players", "mojang", term.as_str()]),
            QueryKey::Status(uuid) => Self::new(["v1", "players", "status", uuid.as_str()]),
            QueryKey::Hypixel(uuid) => Self::new(["v1", "players", "hypixel", uuid.as_str()]),
            QueryKey::HypixelGuildPage { guild_id, page } => {
                Self::new(["v1", "hypixel", "guilds", guild_id.as_str()])
                    .with_query("limit", GUILD_PAGE_SIZE.to_string())
                    .with_query("offset", (page * GUILD_PAGE_SIZE).to_string())
            }
            QueryKey::Wynncraft(uuid) => Self::new(["v1", "players", "wynncraft", uuid.as_str()]),
            QueryKey::WynncraftGuild(prefix) => {
                Self::new(["v1", "wynncraft", "guilds", prefix.as_str()])
            }
            QueryKey::AbilityTree {
                uuid,
                character_uuid,
                class,
            } => Self::new([
                "v1",
                "players",
                "wynncraft",
                uuid.as_str(),
                "characters",
                character_uuid.as_str(),
                "ability-tree",
            ])
            .with_query("class", class.as_str()),
            QueryKey::DonutSmp(username) => {
                Self::new(["v1", "players", "donutsmp", username.as_str()])
            }
            QueryKey::MccIsland(uuid) => Self::new(["v1", "players", "mccisland", uuid.as_str()]),
            QueryKey::Capes(uuid) => Self::new(["v1", "players", "capes", uuid.as_str()]),
            QueryKey::MetricDistribution { metric_key, uuid } => Self::new([
                "v1",
                "metrics",
                metric_key.as_str(),
                "distribution",
                uuid.as_str(),
            ]),
        }
    }

    /// Join onto `base` (trailing slashes ignored), encoding each path segment and
    /// query value with `encode`.
    pub fn to_url(&self, base: &str, encode: impl Fn(&str) -> String) -> String {
        let mut url = base.trim_end_matches('/').to_owned();
        for segment in &self.segments {
            url.push('/');
            url.push_str(&encode(segment));
        }
        for (i, (name, value)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&encode(value));
        }
        url
    }
}

//! Per-service payloads. Only the fields the client reads are typed; everything
//! else is carried through untouched in `extra`.

use serde::{Deserialize, Serialize};

type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypixelProfile {
    pub player: HypixelPlayer,
    #[serde(default)]
    pub guild: Option<HypixelGuild>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl HypixelProfile {
    pub fn guild_id(&self) -> Option<&str> {
        self.guild
            .as_ref()
            .map(|g| g.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypixelPlayer {
    pub uuid: String,
    #[serde(default)]
    pub network_level: Option<f64>,
    #[serde(default)]
    pub karma: Option<i64>,
    #[serde(default)]
    pub achievement_points: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypixelGuild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One resolved member on a Hypixel guild roster page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypixelGuildMember {
    pub uuid: String,
    pub username: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub joined: Option<String>,
    #[serde(default)]
    pub skin_showcase_b64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WynncraftProfile {
    pub uuid: String,
    pub username: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub guild_name: Option<String>,
    #[serde(default)]
    pub guild_prefix: Option<String>,
    #[serde(default)]
    pub characters: Vec<WynncraftCharacter>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl WynncraftProfile {
    pub fn guild_prefix(&self) -> Option<&str> {
        self.guild_prefix
            .as_deref()
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
    }

    pub fn character(&self, character_uuid: &str) -> Option<&WynncraftCharacter> {
        self.characters
            .iter()
            .find(|c| c.character_uuid == character_uuid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WynncraftCharacter {
    pub character_uuid: String,
    pub character_class: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WynncraftGuild {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub wars: u64,
    #[serde(default)]
    pub territories: u32,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub members: Vec<WynncraftGuildMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WynncraftGuildMember {
    pub uuid: String,
    pub username: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub joined: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityTreePage {
    pub page_number: u32,
    #[serde(default)]
    pub nodes: Vec<serde_json::Value>,
}

/// Donut SMP stats. The service addresses players by username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonutProfile {
    #[serde(flatten)]
    pub stats: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MccIslandProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

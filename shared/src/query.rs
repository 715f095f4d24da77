use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::AbilityClass;

/// Why a fetch did not produce a record.
///
/// `NotFound` is deliberately absent: a 404 is a valid outcome and is carried as
/// `Ok(None)` in a [`FetchOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A required identifying parameter was empty when the fetch was attempted.
    #[error("missing required argument: {0}")]
    InvalidArguments(&'static str),
    #[error("server error (HTTP {0})")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Errors that should be surfaced to the user as a transient, per-section failure.
    pub fn is_server_error(&self) -> bool {
        !matches!(self, Self::InvalidArguments(_))
    }
}

/// `Ok(None)` means the entity does not exist on the queried service.
pub type FetchOutcome<T> = Result<Option<T>, FetchError>;

/// Classify a raw HTTP response the same way for every endpoint.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> FetchOutcome<T> {
    if status == 404 {
        return Ok(None);
    }
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// Lifecycle of one cache entry: `Idle -> Pending -> {Success | NotFound | Error}`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Pending,
    Success(T),
    NotFound,
    Error(FetchError),
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> QueryState<T> {
    pub fn from_outcome(outcome: FetchOutcome<T>) -> Self {
        match outcome {
            Ok(Some(value)) => Self::Success(value),
            Ok(None) => Self::NotFound,
            Err(e) => Self::Error(e),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::NotFound | Self::Error(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> QueryState<&T> {
        match self {
            Self::Idle => QueryState::Idle,
            Self::Pending => QueryState::Pending,
            Self::Success(value) => QueryState::Success(value),
            Self::NotFound => QueryState::NotFound,
            Self::Error(e) => QueryState::Error(e.clone()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            Self::Idle => QueryState::Idle,
            Self::Pending => QueryState::Pending,
            Self::Success(value) => QueryState::Success(f(value)),
            Self::NotFound => QueryState::NotFound,
            Self::Error(e) => QueryState::Error(e),
        }
    }
}

impl<T: Clone> QueryState<&T> {
    pub fn cloned(self) -> QueryState<T> {
        self.map(Clone::clone)
    }
}

/// Composite cache key: resource kind plus every parameter that identifies the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Identity(String),
    Status(String),
    Hypixel(String),
    HypixelGuildPage {
        guild_id: String,
        page: usize,
    },
    Wynncraft(String),
    WynncraftGuild(String),
    AbilityTree {
        uuid: String,
        character_uuid: String,
        class: AbilityClass,
    },
    DonutSmp(String),
    MccIsland(String),
    Capes(String),
    MetricDistribution {
        metric_key: String,
        uuid: String,
    },
}

impl QueryKey {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identity(_) => "mojang",
            Self::Status(_) => "status",
            Self::Hypixel(_) => "hypixel",
            Self::HypixelGuildPage { .. } => "hypixel_guild",
            Self::Wynncraft(_) => "wynncraft",
            Self::WynncraftGuild(_) => "wynncraft_guild",
            Self::AbilityTree { .. } => "wynncraft_ability_tree",
            Self::DonutSmp(_) => "donutsmp",
            Self::MccIsland(_) => "mccisland",
            Self::Capes(_) => "capes",
            Self::MetricDistribution { .. } => "metric",
        }
    }

    /// Reject keys whose identifying parameters are empty. Enablement should make
    /// this unreachable; hitting it is a caller bug.
    pub fn validate(&self) -> Result<(), FetchError> {
        let missing = match self {
            Self::Identity(term) => term.trim().is_empty().then_some("term"),
            Self::Status(uuid)
            | Self::Hypixel(uuid)
            | Self::Wynncraft(uuid)
            | Self::MccIsland(uuid)
            | Self::Capes(uuid) => uuid.is_empty().then_some("uuid"),
            Self::HypixelGuildPage { guild_id, .. } => guild_id.is_empty().then_some("guild_id"),
            Self::WynncraftGuild(prefix) => prefix.is_empty().then_some("guild_prefix"),
            Self::AbilityTree {
                uuid,
                character_uuid,
                ..
            } => {
                if uuid.is_empty() {
                    Some("uuid")
                } else if character_uuid.is_empty() {
                    Some("character_uuid")
                } else {
                    None
                }
            }
            Self::DonutSmp(username) => username.is_empty().then_some("username"),
            Self::MetricDistribution { metric_key, uuid } => {
                if metric_key.is_empty() {
                    Some("metric_key")
                } else if uuid.is_empty() {
                    Some("uuid")
                } else {
                    None
                }
            }
        };
        match missing {
            Some(name) => Err(FetchError::InvalidArguments(name)),
            None => Ok(()),
        }
    }
}

//! Query dependency graph for one player dashboard.
//!
//! [`PlayerSession`] does no I/O. A driver loops: take the keys that became
//! fetchable from [`PlayerSession::poll_requests`], issue them concurrently, and
//! feed each raw response back through [`PlayerSession::complete`]. Enablement is
//! re-evaluated on every poll, so dependent fetches start as soon as their inputs
//! exist and never before.

use serde::de::DeserializeOwned;

use crate::api::AbilityClass;
use crate::cache::QueryCache;
use crate::guild::GuildRoster;
use crate::metric::{MetricDistribution, MetricSelection};
use crate::player::{Cape, PlayerIdentity, PlayerStatus};
use crate::query::{FetchError, FetchOutcome, QueryKey, QueryState, decode_response};
use crate::services::{
    AbilityTreePage, DonutProfile, HypixelGuildMember, HypixelProfile, MccIslandProfile,
    WynncraftGuild, WynncraftProfile,
};
use crate::tabs::{ServiceTab, TabSelection};

/// Status line and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// `Err` means no HTTP response at all: a rejected key or a transport failure.
pub type TransportResult = Result<RawResponse, FetchError>;

/// Independently failing parts of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceSection {
    Identity,
    Status,
    Hypixel,
    HypixelGuild,
    Wynncraft,
    WynncraftGuild,
    AbilityTree,
    DonutSmp,
    MccIsland,
    Capes,
    Metric,
}

impl ServiceSection {
    pub fn of(key: &QueryKey) -> Self {
        match key {
            QueryKey::Identity(_) => Self::Identity,
            QueryKey::Status(_) => Self::Status,
            QueryKey::Hypixel(_) => Self::Hypixel,
            QueryKey::HypixelGuildPage { .. } => Self::HypixelGuild,
            QueryKey::Wynncraft(_) => Self::Wynncraft,
            QueryKey::WynncraftGuild(_) => Self::WynncraftGuild,
            QueryKey::AbilityTree { .. } => Self::AbilityTree,
            QueryKey::DonutSmp(_) => Self::DonutSmp,
            QueryKey::MccIsland(_) => Self::MccIsland,
            QueryKey::Capes(_) => Self::Capes,
            QueryKey::MetricDistribution { .. } => Self::Metric,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Mojang",
            Self::Status => "Status",
            Self::Hypixel => "Hypixel",
            Self::HypixelGuild => "Hypixel guild",
            Self::Wynncraft => "Wynncraft",
            Self::WynncraftGuild => "Wynncraft guild",
            Self::AbilityTree => "Ability tree",
            Self::DonutSmp => "Donut SMP",
            Self::MccIsland => "MCC Island",
            Self::Capes => "Capes",
            Self::Metric => "Metric",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The active search term resolved; the driver records the username in history.
    IdentityResolved(PlayerIdentity),
    Updated(ServiceSection),
    /// The response arrived for an entry that was no longer in flight.
    Ignored,
}

#[derive(Debug, Default)]
pub struct PlayerSession {
    term: Option<String>,
    identity: QueryCache<String, PlayerIdentity>,
    status: QueryCache<String, PlayerStatus>,
    hypixel: QueryCache<String, HypixelProfile>,
    guild_pages: QueryCache<QueryKey, Vec<HypixelGuildMember>>,
    wynncraft: QueryCache<String, WynncraftProfile>,
    wynncraft_guild: QueryCache<String, WynncraftGuild>,
    ability_trees: QueryCache<QueryKey, Vec<AbilityTreePage>>,
    donut: QueryCache<String, DonutProfile>,
    mcc_island: QueryCache<String, MccIslandProfile>,
    capes: QueryCache<String, Vec<Cape>>,
    metrics: QueryCache<QueryKey, MetricDistribution>,
    roster: GuildRoster,
    guild_page_wanted: bool,
    metric: MetricSelection,
    tabs: TabSelection,
    ability_tree: Option<(String, AbilityClass)>,
    refetch: Vec<QueryKey>,
}

fn decode<T: DeserializeOwned>(response: TransportResult) -> FetchOutcome<T> {
    response.and_then(|raw| decode_response(raw.status, &raw.body))
}

fn cached_outcome<T: Clone>(state: QueryState<&T>) -> Option<FetchOutcome<T>> {
    match state {
        QueryState::Success(value) => Some(Ok(Some(value.clone()))),
        QueryState::NotFound => Some(Ok(None)),
        QueryState::Error(e) => Some(Err(e)),
        QueryState::Idle | QueryState::Pending => None,
    }
}

impl PlayerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the dashboard to `term`. Everything keyed by the previous player
    /// stays cached but is no longer read; unkeyed local state is reset.
    pub fn search(&mut self, term: &str) -> Result<bool, FetchError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(FetchError::InvalidArguments("term"));
        }
        if self.term.as_deref() == Some(term) {
            return Ok(false);
        }
        self.term = Some(term.to_owned());
        self.roster.reset(None, None);
        self.guild_page_wanted = false;
        self.metric.clear();
        self.tabs.clear();
        self.ability_tree = None;
        self.refetch.clear();
        Ok(true)
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Keys whose enablement predicate holds and that are not cached or in flight.
    /// Each returned key must be fetched exactly once.
    pub fn poll_requests(&mut self) -> Vec<QueryKey> {
        let mut out = std::mem::take(&mut self.refetch);
        let Some(term) = self.term.clone() else {
            return out;
        };

        if self.identity.begin(term.clone()) {
            out.push(QueryKey::Identity(term.clone()));
        }
        let Some(PlayerIdentity { uuid, username, .. }) = self.identity.get(&term).cloned()
        else {
            return out;
        };

        if self.status.begin(uuid.clone()) {
            out.push(QueryKey::Status(uuid.clone()));
        }
        if self.hypixel.begin(uuid.clone()) {
            out.push(QueryKey::Hypixel(uuid.clone()));
        }
        if self.wynncraft.begin(uuid.clone()) {
            out.push(QueryKey::Wynncraft(uuid.clone()));
        }
        if self.donut.begin(username.clone()) {
            out.push(QueryKey::DonutSmp(username.clone()));
        }
        if self.mcc_island.begin(uuid.clone()) {
            out.push(QueryKey::MccIsland(uuid.clone()));
        }
        if self.capes.begin(uuid.clone()) {
            out.push(QueryKey::Capes(uuid.clone()));
        }

        let guild_id = self
            .hypixel
            .get(&uuid)
            .and_then(HypixelProfile::guild_id)
            .map(str::to_owned);
        self.roster.reset(Some(&uuid), guild_id.as_deref());
        if let Some(key) = self.next_guild_page() {
            out.push(key);
        }

        if let Some(prefix) = self
            .wynncraft
            .get(&uuid)
            .and_then(WynncraftProfile::guild_prefix)
            .map(str::to_owned)
            && self.wynncraft_guild.begin(prefix.clone())
        {
            out.push(QueryKey::WynncraftGuild(prefix));
        }

        if let Some((character_uuid, class)) = self.ability_tree.clone() {
            let key = QueryKey::AbilityTree {
                uuid: uuid.clone(),
                character_uuid,
                class,
            };
            if self.ability_trees.begin(key.clone()) {
                out.push(key);
            }
        }

        if let Some(key) = self.metric.key(Some(&uuid))
            && self.metrics.begin(key.clone())
        {
            out.push(key);
        }

        out
    }

    fn next_guild_page(&mut self) -> Option<QueryKey> {
        let first_page = self.roster.pages_loaded() == 0;
        if !first_page && !self.guild_page_wanted {
            return None;
        }
        let (guild_id, page) = self.roster.request_next()?;
        self.guild_page_wanted = false;
        let key = QueryKey::HypixelGuildPage {
            guild_id: guild_id.clone(),
            page,
        };
        if self.guild_pages.begin(key.clone()) {
            return Some(key);
        }
        if self.guild_pages.state(&key).error().is_some() {
            self.guild_pages.invalidate(&key);
            return Some(key);
        }
        // Already cached for this guild: replay it into the fresh roster.
        if let Some(outcome) = cached_outcome(self.guild_pages.state(&key)) {
            self.roster.receive(&guild_id, page, outcome);
        }
        None
    }

    /// Feed back the response for a key previously returned by `poll_requests`.
    pub fn complete(&mut self, key: &QueryKey, response: TransportResult) -> SessionEvent {
        let section = ServiceSection::of(key);
        let settled = match key {
            QueryKey::Identity(term) => {
                let outcome: FetchOutcome<PlayerIdentity> = decode(response);
                let resolved = outcome.as_ref().ok().cloned().flatten();
                if !self.identity.settle(term, outcome) {
                    return SessionEvent::Ignored;
                }
                if let Some(identity) = resolved
                    && self.term.as_deref() == Some(term.as_str())
                {
                    tracing::info!(term, uuid = %identity.uuid, "identity resolved");
                    return SessionEvent::IdentityResolved(identity);
                }
                true
            }
            QueryKey::Status(uuid) => self.status.settle(uuid, decode(response)),
            QueryKey::Hypixel(uuid) => self.hypixel.settle(uuid, decode(response)),
            QueryKey::HypixelGuildPage { guild_id, page } => {
                let outcome: FetchOutcome<Vec<HypixelGuildMember>> = decode(response);
                let settled = self.guild_pages.settle(key, outcome.clone());
                self.roster.receive(guild_id, *page, outcome);
                settled
            }
            QueryKey::Wynncraft(uuid) => self.wynncraft.settle(uuid, decode(response)),
            QueryKey::WynncraftGuild(prefix) => {
                self.wynncraft_guild.settle(prefix, decode(response))
            }
            QueryKey::AbilityTree { .. } => self.ability_trees.settle(key, decode(response)),
            QueryKey::DonutSmp(username) => self.donut.settle(username, decode(response)),
            QueryKey::MccIsland(uuid) => self.mcc_island.settle(uuid, decode(response)),
            QueryKey::Capes(uuid) => self.capes.settle(uuid, decode(response)),
            QueryKey::MetricDistribution { .. } => self.metrics.settle(key, decode(response)),
        };
        if settled {
            SessionEvent::Updated(section)
        } else {
            SessionEvent::Ignored
        }
    }

    pub fn identity(&self) -> QueryState<&PlayerIdentity> {
        match &self.term {
            Some(term) => self.identity.state(term),
            None => QueryState::Idle,
        }
    }

    fn active_uuid(&self) -> Option<&str> {
        match self.identity() {
            QueryState::Success(identity) => Some(identity.uuid.as_str()),
            _ => None,
        }
    }

    fn active_username(&self) -> Option<&str> {
        match self.identity() {
            QueryState::Success(identity) => Some(identity.username.as_str()),
            _ => None,
        }
    }

    fn by_uuid<'a, T>(&self, cache: &'a QueryCache<String, T>) -> QueryState<&'a T> {
        match self.active_uuid() {
            Some(uuid) => cache.state(&uuid.to_owned()),
            None => QueryState::Idle,
        }
    }

    pub fn status(&self) -> QueryState<&PlayerStatus> {
        self.by_uuid(&self.status)
    }

    pub fn hypixel(&self) -> QueryState<&HypixelProfile> {
        self.by_uuid(&self.hypixel)
    }

    pub fn wynncraft(&self) -> QueryState<&WynncraftProfile> {
        self.by_uuid(&self.wynncraft)
    }

    pub fn mcc_island(&self) -> QueryState<&MccIslandProfile> {
        self.by_uuid(&self.mcc_island)
    }

    pub fn capes(&self) -> QueryState<&Vec<Cape>> {
        self.by_uuid(&self.capes)
    }

    pub fn donut(&self) -> QueryState<&DonutProfile> {
        match self.active_username() {
            Some(username) => self.donut.state(&username.to_owned()),
            None => QueryState::Idle,
        }
    }

    pub fn wynncraft_guild(&self) -> QueryState<&WynncraftGuild> {
        let prefix = self
            .wynncraft()
            .data()
            .and_then(|profile| profile.guild_prefix())
            .map(str::to_owned);
        match prefix {
            Some(prefix) => self.wynncraft_guild.state(&prefix),
            None => QueryState::Idle,
        }
    }

    pub fn guild_roster(&self) -> &GuildRoster {
        &self.roster
    }

    /// Ask for the next roster page; a failed page is retried.
    pub fn load_more_guild_members(&mut self) {
        if self.roster.is_fetching_next_page() {
            return;
        }
        if self.roster.error().is_some() {
            self.roster.retry();
        }
        self.guild_page_wanted = true;
    }

    pub fn select_ability_tree(&mut self, character_uuid: &str, class: AbilityClass) {
        self.ability_tree = Some((character_uuid.to_owned(), class));
    }

    pub fn ability_tree(&self) -> QueryState<&Vec<AbilityTreePage>> {
        let (Some(uuid), Some((character_uuid, class))) = (self.active_uuid(), &self.ability_tree)
        else {
            return QueryState::Idle;
        };
        self.ability_trees.state(&QueryKey::AbilityTree {
            uuid: uuid.to_owned(),
            character_uuid: character_uuid.clone(),
            class: *class,
        })
    }

    pub fn select_metric(&mut self, metric_key: &str) {
        self.metric.select(metric_key);
    }

    pub fn clear_metric(&mut self) {
        self.metric.clear();
    }

    pub fn selected_metric(&self) -> Option<&str> {
        self.metric.selected()
    }

    pub fn metric(&self) -> QueryState<&MetricDistribution> {
        self.metric.view(&self.metrics, self.active_uuid())
    }

    /// Service tabs whose profile loaded successfully, in display order.
    pub fn loaded_tabs(&self) -> Vec<ServiceTab> {
        ServiceTab::ALL
            .into_iter()
            .filter(|tab| match tab {
                ServiceTab::Hypixel => self.hypixel().is_success(),
                ServiceTab::Wynncraft => self.wynncraft().is_success(),
                ServiceTab::DonutSmp => self.donut().is_success(),
                ServiceTab::MccIsland => self.mcc_island().is_success(),
            })
            .collect()
    }

    pub fn select_tab(&mut self, tab: ServiceTab) {
        self.tabs.choose(tab);
    }

    pub fn selected_tab(&self) -> Option<ServiceTab> {
        self.tabs.reconcile(&self.loaded_tabs())
    }

    /// True until every service tab has settled, one way or another.
    pub fn is_loading_services(&self) -> bool {
        self.identity().is_success()
            && !(self.hypixel().is_terminal()
                && self.wynncraft().is_terminal()
                && self.donut().is_terminal()
                && self.mcc_island().is_terminal())
    }

    /// Sections of the active player that ended in an error.
    pub fn failed_sections(&self) -> Vec<(ServiceSection, FetchError)> {
        let mut failed = Vec::new();
        let mut push = |section, error: Option<&FetchError>| {
            if let Some(e) = error {
                failed.push((section, e.clone()));
            }
        };
        push(ServiceSection::Identity, self.identity().error());
        push(ServiceSection::Status, self.status().error());
        push(ServiceSection::Hypixel, self.hypixel().error());
        push(ServiceSection::HypixelGuild, self.roster.error());
        push(ServiceSection::Wynncraft, self.wynncraft().error());
        push(ServiceSection::WynncraftGuild, self.wynncraft_guild().error());
        push(ServiceSection::AbilityTree, self.ability_tree().error());
        push(ServiceSection::DonutSmp, self.donut().error());
        push(ServiceSection::MccIsland, self.mcc_island().error());
        push(ServiceSection::Capes, self.capes().error());
        push(ServiceSection::Metric, self.metric().error());
        failed
    }

    /// Invalidate the active entry for `section`; the next poll refetches it.
    pub fn refresh(&mut self, section: ServiceSection) -> bool {
        let Some(key) = self.active_key(section) else {
            return false;
        };
        let invalidated = match &key {
            QueryKey::Identity(term) => self.identity.invalidate(term),
            QueryKey::Status(uuid) => self.status.invalidate(uuid),
            QueryKey::Hypixel(uuid) => self.hypixel.invalidate(uuid),
            QueryKey::Wynncraft(uuid) => self.wynncraft.invalidate(uuid),
            QueryKey::WynncraftGuild(prefix) => self.wynncraft_guild.invalidate(prefix),
            QueryKey::DonutSmp(username) => self.donut.invalidate(username),
            QueryKey::MccIsland(uuid) => self.mcc_island.invalidate(uuid),
            QueryKey::Capes(uuid) => self.capes.invalidate(uuid),
            QueryKey::AbilityTree { .. } => self.ability_trees.invalidate(&key),
            QueryKey::MetricDistribution { .. } => self.metrics.invalidate(&key),
            QueryKey::HypixelGuildPage { .. } => false,
        };
        if invalidated {
            self.refetch.push(key);
        }
        invalidated
    }

    fn active_key(&self, section: ServiceSection) -> Option<QueryKey> {
        let uuid = || self.active_uuid().map(str::to_owned);
        Some(match section {
            ServiceSection::Identity => QueryKey::Identity(self.term.clone()?),
            ServiceSection::Status => QueryKey::Status(uuid()?),
            ServiceSection::Hypixel => QueryKey::Hypixel(uuid()?),
            ServiceSection::Wynncraft => QueryKey::Wynncraft(uuid()?),
            ServiceSection::MccIsland => QueryKey::MccIsland(uuid()?),
            ServiceSection::Capes => QueryKey::Capes(uuid()?),
            ServiceSection::DonutSmp => QueryKey::DonutSmp(self.active_username()?.to_owned()),
            ServiceSection::WynncraftGuild => QueryKey::WynncraftGuild(
                self.wynncraft().data()?.guild_prefix()?.to_owned(),
            ),
            ServiceSection::AbilityTree => {
                let (character_uuid, class) = self.ability_tree.clone()?;
                QueryKey::AbilityTree {
                    uuid: uuid()?,
                    character_uuid,
                    class,
                }
            }
            ServiceSection::Metric => self.metric.key(self.active_uuid())?,
            // Roster pages recover through `load_more_guild_members`.
            ServiceSection::HypixelGuild => return None,
        })
    }
}

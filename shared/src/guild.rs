use std::collections::HashSet;

use crate::api::GUILD_PAGE_SIZE;
use crate::query::{FetchError, FetchOutcome};
use crate::services::HypixelGuildMember;

/// Incrementally accumulated Hypixel guild roster for one `(player, guild)` pair.
///
/// Pages are requested strictly in order from 0. A page shorter than
/// [`GUILD_PAGE_SIZE`] (or a 404) ends the roster. While a page is in flight,
/// further requests are no-ops.
#[derive(Debug, Clone, Default)]
pub struct GuildRoster {
    player: Option<String>,
    guild_id: Option<String>,
    members: Vec<HypixelGuildMember>,
    seen: HashSet<String>,
    next_page: usize,
    in_flight: Option<usize>,
    exhausted: bool,
    error: Option<FetchError>,
}

impl GuildRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every accumulated page and rescope to a new pair. A no-op when the
    /// scope is unchanged.
    pub fn reset(&mut self, player: Option<&str>, guild_id: Option<&str>) {
        if self.player.as_deref() == player && self.guild_id.as_deref() == guild_id {
            return;
        }
        *self = Self {
            player: player.map(str::to_owned),
            guild_id: guild_id.map(str::to_owned),
            ..Self::default()
        };
    }

    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    /// Claim the next page to fetch, or `None` when nothing should be requested.
    pub fn request_next(&mut self) -> Option<(String, usize)> {
        let guild_id = self.guild_id.clone()?;
        if self.in_flight.is_some() || self.exhausted || self.error.is_some() {
            return None;
        }
        let page = self.next_page;
        self.in_flight = Some(page);
        Some((guild_id, page))
    }

    /// Accept a page response. Responses for another guild, or for a page that
    /// is not the one in flight, are discarded.
    pub fn receive(
        &mut self,
        guild_id: &str,
        page: usize,
        outcome: FetchOutcome<Vec<HypixelGuildMember>>,
    ) -> bool {
        if self.guild_id.as_deref() != Some(guild_id) || self.in_flight != Some(page) {
            return false;
        }
        self.in_flight = None;
        match outcome {
            Ok(Some(batch)) => {
                if batch.len() < GUILD_PAGE_SIZE {
                    self.exhausted = true;
                }
                for member in batch {
                    if self.seen.insert(member.uuid.clone()) {
                        self.members.push(member);
                    }
                }
                self.next_page = page + 1;
            }
            Ok(None) => self.exhausted = true,
            Err(e) => {
                tracing::warn!(guild_id, page, error = %e, "guild roster page failed");
                self.error = Some(e);
            }
        }
        true
    }

    /// Clear a failed page so the next `request_next` tries it again.
    pub fn retry(&mut self) {
        self.error = None;
    }

    pub fn members(&self) -> &[HypixelGuildMember] {
        &self.members
    }

    pub fn has_next_page(&self) -> bool {
        self.guild_id.is_some() && !self.exhausted
    }

    pub fn is_fetching_next_page(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pages_loaded(&self) -> usize {
        self.next_page
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }
}

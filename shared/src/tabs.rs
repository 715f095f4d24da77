use serde::{Deserialize, Serialize};

/// Dashboard tab, one per game service, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTab {
    Hypixel,
    Wynncraft,
    DonutSmp,
    MccIsland,
}

impl ServiceTab {
    pub const ALL: [Self; 4] = [Self::Hypixel, Self::Wynncraft, Self::DonutSmp, Self::MccIsland];

    pub fn label(self) -> &'static str {
        match self {
            Self::Hypixel => "Hypixel",
            Self::Wynncraft => "Wynncraft",
            Self::DonutSmp => "Donut SMP",
            Self::MccIsland => "MCC Island",
        }
    }
}

/// User tab choice, reconciled against whichever tabs have loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabSelection {
    chosen: Option<ServiceTab>,
}

impl TabSelection {
    pub fn choose(&mut self, tab: ServiceTab) {
        self.chosen = Some(tab);
    }

    pub fn clear(&mut self) {
        self.chosen = None;
    }

    /// Keep the chosen tab while it is loaded, otherwise fall back to the first
    /// loaded tab. Recomputed whenever the loaded set changes.
    pub fn reconcile(&self, loaded: &[ServiceTab]) -> Option<ServiceTab> {
        match self.chosen {
            Some(tab) if loaded.contains(&tab) => Some(tab),
            _ => loaded.first().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_loaded_tab_is_selected_by_default() {
        let selection = TabSelection::default();
        assert_eq!(selection.reconcile(&[]), None);
        assert_eq!(
            selection.reconcile(&[ServiceTab::Wynncraft, ServiceTab::MccIsland]),
            Some(ServiceTab::Wynncraft)
        );
    }

    #[test]
    fn user_choice_wins_once_loaded() {
        let mut selection = TabSelection::default();
        selection.choose(ServiceTab::MccIsland);
        assert_eq!(
            selection.reconcile(&[ServiceTab::Hypixel]),
            Some(ServiceTab::Hypixel)
        );
        assert_eq!(
            selection.reconcile(&[ServiceTab::Hypixel, ServiceTab::MccIsland]),
            Some(ServiceTab::MccIsland)
        );
    }
}

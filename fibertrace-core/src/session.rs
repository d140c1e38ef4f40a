// View state: the loaded topology, selected network, display unit and
// current highlight, plus generation tokens for topology loads.

use crate::error::{Result, TopologyError};
use crate::highlight::{HighlightRenderer, HighlightState};
use crate::model::{Edge, Network, NetworkSet};
use crate::path::{PathOutcome, resolve_path};
use crate::table::{TableRow, distance_table};
use crate::units::DistanceUnit;
use tracing::{debug, info};

/// Generation number of one topology load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct LoadTracker {
    issued: u64,
}

impl LoadTracker {
    pub fn begin(&mut self) -> LoadToken {
        self.issued += 1;
        LoadToken(self.issued)
    }

    pub fn latest(&self) -> Option<LoadToken> {
        (self.issued > 0).then_some(LoadToken(self.issued))
    }

    pub fn is_current(&self, token: LoadToken) -> bool {
        token.0 == self.issued
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadApplied {
    Applied,
    /// A newer load was started after this one; the result was dropped
    Stale { token: LoadToken, latest: LoadToken },
}

#[derive(Debug, Default)]
pub struct ViewState {
    networks: Option<NetworkSet>,
    current: Option<String>,
    unit: DistanceUnit,
    highlight: HighlightState,
    loads: LoadTracker,
}

impl ViewState {
    pub fn new(unit: DistanceUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    /// Network to select once a topology arrives. Ignored if the loaded
    /// document does not contain it.
    pub fn with_preferred_network(mut self, map_id: impl Into<String>) -> Self {
        self.current = Some(map_id.into());
        self
    }

    pub fn begin_load(&mut self) -> LoadToken {
        let token = self.loads.begin();
        debug!("Started topology load #{}", token.generation());
        token
    }

    pub fn is_current_load(&self, token: LoadToken) -> bool {
        self.loads.is_current(token)
    }

    /// Swaps in a freshly loaded topology if `token` belongs to the newest
    /// load. The previous highlight is always reset on a swap.
    pub fn finish_load<R: HighlightRenderer + ?Sized>(
        &mut self,
        token: LoadToken,
        networks: NetworkSet,
        renderer: &mut R,
    ) -> LoadApplied {
        if let Some(latest) = self.loads.latest()
            && latest != token
        {
            debug!(
                "Dropping stale topology load #{} (latest is #{})",
                token.generation(),
                latest.generation()
            );
            return LoadApplied::Stale { token, latest };
        }

        self.highlight.clear(renderer);

        let keep_current = self
            .current
            .as_deref()
            .is_some_and(|id| networks.get(id).is_some());
        if !keep_current {
            self.current = networks.first().map(|n| n.map_id().to_string());
        }

        info!(
            "Loaded {} network(s), showing {:?}",
            networks.len(),
            self.current.as_deref().unwrap_or("-")
        );
        self.networks = Some(networks);
        LoadApplied::Applied
    }

    pub fn networks(&self) -> Option<&NetworkSet> {
        self.networks.as_ref()
    }

    pub fn current_network(&self) -> Result<&Network> {
        let networks = self.networks.as_ref().ok_or(TopologyError::NothingLoaded)?;
        let id = self.current.as_deref().ok_or(TopologyError::NothingLoaded)?;
        networks
            .get(id)
            .ok_or_else(|| TopologyError::UnknownNetwork(id.to_string()))
    }

    pub fn select_network<R: HighlightRenderer + ?Sized>(
        &mut self,
        map_id: &str,
        renderer: &mut R,
    ) -> Result<&Network> {
        let networks = self.networks.as_ref().ok_or(TopologyError::NothingLoaded)?;
        if networks.get(map_id).is_none() {
            return Err(TopologyError::UnknownNetwork(map_id.to_string()));
        }

        self.highlight.clear(renderer);
        self.current = Some(map_id.to_string());
        self.current_network()
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: DistanceUnit) {
        self.unit = unit;
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    /// Resolves the path to `target` in the current network and highlights it
    pub fn trace<R: HighlightRenderer + ?Sized>(
        &mut self,
        target: &str,
        renderer: &mut R,
    ) -> Result<PathOutcome> {
        let outcome = resolve_path(self.current_network()?, target);
        self.highlight.apply(renderer, outcome.path());
        Ok(outcome)
    }

    pub fn clear_highlight<R: HighlightRenderer + ?Sized>(&mut self, renderer: &mut R) {
        self.highlight.clear(renderer);
    }

    /// Distance label for every edge of the current network, in the current unit
    pub fn edge_labels(&self) -> Result<Vec<(Edge, String)>> {
        let unit = self.unit;
        Ok(self
            .current_network()?
            .edges()
            .into_iter()
            .map(|edge| {
                let label = unit.format_with_label(edge.distance);
                (edge, label)
            })
            .collect())
    }

    pub fn table(&self) -> Result<Vec<TableRow>> {
        Ok(distance_table(self.current_network()?))
    }
}

// Cable length and coverage figures per network and across a document

use crate::model::{Network, NetworkSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    /// Sum of every segment, in kilometers
    pub total_cable_length: f64,
    /// Largest cumulative distance from the root, in kilometers
    pub max_coverage: f64,
    pub total_points: usize,
}

impl NetworkSummary {
    pub fn compute(network: &Network) -> Self {
        let nodes = network.nodes();
        Self {
            total_cable_length: nodes.iter().map(|n| n.segment_distance).sum(),
            max_coverage: nodes.iter().map(|n| n.total_distance).fold(0.0, f64::max),
            total_points: nodes.len(),
        }
    }

    /// True when any figure differs by more than `tolerance` kilometers
    /// (point counts must match exactly)
    pub fn differs_from(&self, other: &NetworkSummary, tolerance: f64) -> bool {
        (self.total_cable_length - other.total_cable_length).abs() > tolerance
            || (self.max_coverage - other.max_coverage).abs() > tolerance
            || self.total_points != other.total_points
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub total_networks: usize,
    pub combined_cable_length: f64,
    pub total_points: usize,
    pub max_coverage_overall: f64,
}

impl GlobalSummary {
    pub fn compute(set: &NetworkSet) -> Self {
        let summaries: Vec<NetworkSummary> = set.iter().map(NetworkSummary::compute).collect();
        Self {
            total_networks: summaries.len(),
            combined_cable_length: summaries.iter().map(|s| s.total_cable_length).sum(),
            total_points: summaries.iter().map(|s| s.total_points).sum(),
            max_coverage_overall: summaries.iter().map(|s| s.max_coverage).fold(0.0, f64::max),
        }
    }
}

// Fault location for a set of affected nodes (usually customer landlines)

use crate::model::Network;
use crate::path::{PathOutcome, PathResolver};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct FaultReport {
    /// Resolved path for each known id, in request order
    pub outcomes: Vec<(String, PathOutcome)>,
    pub unknown: Vec<String>,
    /// Deepest node upstream of every affected id whose path is complete
    pub common_upstream: Option<String>,
}

impl FaultReport {
    pub fn affected(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|(id, _)| id.as_str())
    }
}

pub fn locate_fault<S: AsRef<str>>(network: &Network, ids: &[S]) -> FaultReport {
    let resolver = PathResolver::new(network);
    let mut seen = HashSet::new();
    let mut outcomes = Vec::new();
    let mut unknown = Vec::new();

    for id in ids.iter().map(AsRef::as_ref) {
        if !seen.insert(id) {
            continue;
        }
        if network.contains(id) {
            outcomes.push((id.to_string(), resolver.resolve(id)));
        } else {
            unknown.push(id.to_string());
        }
    }

    let common_upstream = common_ancestor(&outcomes);

    FaultReport {
        outcomes,
        unknown,
        common_upstream,
    }
}

fn common_ancestor(outcomes: &[(String, PathOutcome)]) -> Option<String> {
    // Ancestors are listed root first, so the shared ones form a common prefix.
    let mut complete = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_complete())
        .map(|(_, outcome)| {
            let mut chain = outcome.path().node_ids();
            chain.pop();
            chain
        });

    let mut prefix = complete.next()?;
    for chain in complete {
        let shared = prefix
            .iter()
            .zip(chain.iter())
            .take_while(|(a, b)| a == b)
            .count();
        prefix.truncate(shared);
    }

    prefix.last().map(|id| id.to_string())
}

use crate::model::Network;
use crate::summary::NetworkSummary;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Allowed drift between a recorded total distance and the sum of its parent
/// total and segment. Documents round to three decimals.
pub const DISTANCE_TOLERANCE: f64 = 0.002;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TopologyIssue {
    DanglingParent { node: String, parent: String },
    Orphan { node: String },
    Cycle { nodes: Vec<String> },
    Unreachable { node: String },
    DistanceMismatch { node: String, expected: f64, recorded: f64 },
    SummaryMismatch { field: &'static str, declared: f64, computed: f64 },
}

impl fmt::Display for TopologyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyIssue::DanglingParent { node, parent } => {
                write!(f, "'{}' is connected to unknown node '{}'", node, parent)
            }
            TopologyIssue::Orphan { node } => write!(f, "'{}' has no parent", node),
            TopologyIssue::Cycle { nodes } => write!(f, "cycle through {}", nodes.join(" -> ")),
            TopologyIssue::Unreachable { node } => {
                write!(f, "'{}' cannot be reached from the DC office", node)
            }
            TopologyIssue::DistanceMismatch {
                node,
                expected,
                recorded,
            } => write!(
                f,
                "'{}' records a total of {:.3} km, parent chain gives {:.3} km",
                node, recorded, expected
            ),
            TopologyIssue::SummaryMismatch {
                field,
                declared,
                computed,
            } => write!(
                f,
                "summary {} is declared as {:.3} but computes to {:.3}",
                field, declared, computed
            ),
        }
    }
}

/// Checks the tree invariant and the recorded distances. An empty result
/// means every node reaches the root through exactly one parent chain.
pub fn validate(network: &Network) -> Vec<TopologyIssue> {
    let mut issues = Vec::new();
    let root_id = network.root_id();

    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let indices: HashMap<&str, NodeIndex> = network
        .nodes()
        .iter()
        .map(|n| (n.id.as_str(), graph.add_node(n.id.as_str())))
        .collect();

    let mut explained: HashSet<&str> = HashSet::new();

    for node in network.nodes().iter().filter(|n| n.id != root_id) {
        let Some(parent_id) = node.parent_id.as_deref() else {
            issues.push(TopologyIssue::Orphan {
                node: node.id.clone(),
            });
            explained.insert(node.id.as_str());
            continue;
        };

        let Some(parent) = network.node(parent_id) else {
            issues.push(TopologyIssue::DanglingParent {
                node: node.id.clone(),
                parent: parent_id.to_string(),
            });
            explained.insert(node.id.as_str());
            continue;
        };

        graph.add_edge(indices[parent.id.as_str()], indices[node.id.as_str()], ());

        let expected = parent.total_distance + node.segment_distance;
        if (expected - node.total_distance).abs() > DISTANCE_TOLERANCE {
            issues.push(TopologyIssue::DistanceMismatch {
                node: node.id.clone(),
                expected,
                recorded: node.total_distance,
            });
        }
    }

    for component in kosaraju_scc(&graph) {
        let is_cycle = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| graph.contains_edge(n, n));
        if is_cycle {
            let mut nodes: Vec<String> = component.iter().map(|&n| graph[n].to_string()).collect();
            nodes.sort();
            for id in &nodes {
                if let Some(node) = network.node(id) {
                    explained.insert(node.id.as_str());
                }
            }
            issues.push(TopologyIssue::Cycle { nodes });
        }
    }

    let mut reachable = HashSet::new();
    let mut dfs = Dfs::new(&graph, indices[root_id]);
    while let Some(index) = dfs.next(&graph) {
        reachable.insert(graph[index]);
    }

    for node in network.nodes() {
        let id = node.id.as_str();
        if !reachable.contains(id) && !explained.contains(id) {
            issues.push(TopologyIssue::Unreachable {
                node: node.id.clone(),
            });
        }
    }

    if let Some(declared) = network.declared_summary() {
        let computed = NetworkSummary::compute(network);
        let checks = [
            (
                "total cable length",
                declared.total_cable_length,
                computed.total_cable_length,
            ),
            ("max coverage", declared.max_coverage, computed.max_coverage),
        ];
        for (field, declared, computed) in checks {
            if (declared - computed).abs() > DISTANCE_TOLERANCE {
                issues.push(TopologyIssue::SummaryMismatch {
                    field,
                    declared,
                    computed,
                });
            }
        }
        if declared.total_points != computed.total_points {
            issues.push(TopologyIssue::SummaryMismatch {
                field: "total points",
                declared: declared.total_points as f64,
                computed: computed.total_points as f64,
            });
        }
    }

    issues
}

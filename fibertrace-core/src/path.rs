use crate::model::{Edge, Network};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::{debug, warn};

/// Edges from the root (or from wherever the walk broke off) to a target
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    target: String,
    edges: Vec<Edge>,
}

impl Path {
    pub fn new(target: impl Into<String>, edges: Vec<Edge>) -> Self {
        Self {
            target: target.into(),
            edges,
        }
    }

    pub fn empty(target: impl Into<String>) -> Self {
        Self::new(target, Vec::new())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of the segment distances along the path, in kilometers
    pub fn total_distance(&self) -> f64 {
        self.edges.iter().map(|e| e.distance).sum()
    }

    /// Every node the path touches, in walk order. The target is always
    /// included, even for an empty path.
    pub fn node_ids(&self) -> Vec<&str> {
        match self.edges.first() {
            None => vec![self.target.as_str()],
            Some(first) => std::iter::once(first.from.as_str())
                .chain(self.edges.iter().map(|e| e.to.as_str()))
                .collect(),
        }
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.target == id || self.edges.iter().any(|e| e.touches(id))
    }
}

/// Why a walk stopped before reaching the root
#[derive(Debug, Clone, PartialEq)]
pub enum PathBreak {
    /// The target id is not in the network
    UnknownTarget,
    /// `node` points at a parent that does not exist
    Dangling { node: String, missing_parent: String },
    /// The walk came back to `at`
    Cycle { at: String },
    /// `node` is not the root but has no parent
    Orphan { node: String },
}

impl fmt::Display for PathBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathBreak::UnknownTarget => write!(f, "target is not part of the network"),
            PathBreak::Dangling {
                node,
                missing_parent,
            } => write!(f, "'{}' is connected to unknown node '{}'", node, missing_parent),
            PathBreak::Cycle { at } => write!(f, "cycle detected at '{}'", at),
            PathBreak::Orphan { node } => write!(f, "'{}' has no parent", node),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    Complete(Path),
    Partial { path: Path, reason: PathBreak },
}

impl PathOutcome {
    pub fn path(&self) -> &Path {
        match self {
            PathOutcome::Complete(path) => path,
            PathOutcome::Partial { path, .. } => path,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        self.path().edges()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PathOutcome::Complete(_))
    }

    pub fn reason(&self) -> Option<&PathBreak> {
        match self {
            PathOutcome::Complete(_) => None,
            PathOutcome::Partial { reason, .. } => Some(reason),
        }
    }
}

/// Walks `parent_id` links from a node back to the network root
pub struct PathResolver<'a> {
    network: &'a Network,
}

impl<'a> PathResolver<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    pub fn resolve(&self, target: &str) -> PathOutcome {
        let network = self.network;
        let root = network.root_id();

        let Some(mut current) = network.node(target) else {
            warn!("Cannot trace '{}': not in network '{}'", target, network.map_id());
            return PathOutcome::Partial {
                path: Path::empty(target),
                reason: PathBreak::UnknownTarget,
            };
        };

        let mut edges = VecDeque::new();
        let mut visited = HashSet::new();

        let reason = loop {
            if current.id == root {
                debug!("Traced '{}' in {} hop(s)", target, edges.len());
                return PathOutcome::Complete(Path::new(target, edges.into()));
            }

            if !visited.insert(current.id.as_str()) {
                break PathBreak::Cycle {
                    at: current.id.clone(),
                };
            }

            let Some(parent_id) = current.parent_id.as_deref() else {
                break PathBreak::Orphan {
                    node: current.id.clone(),
                };
            };

            let Some(parent) = network.node(parent_id) else {
                break PathBreak::Dangling {
                    node: current.id.clone(),
                    missing_parent: parent_id.to_string(),
                };
            };

            edges.push_front(Edge::new(&parent.id, &current.id, current.segment_distance));
            current = parent;
        };

        warn!(
            "Path to '{}' in network '{}' is partial: {}",
            target,
            network.map_id(),
            reason
        );
        PathOutcome::Partial {
            path: Path::new(target, edges.into()),
            reason,
        }
    }
}

pub fn resolve_path(network: &Network, target: &str) -> PathOutcome {
    PathResolver::new(network).resolve(target)
}

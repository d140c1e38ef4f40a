use crate::error::{Result, TopologyError};
use crate::summary::{GlobalSummary, NetworkSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    DcOffice,
    Joint,
    Olt,
    Splitter,
    Customer,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::DcOffice => "dc_office",
            NodeKind::Joint => "joint",
            NodeKind::Olt => "olt",
            NodeKind::Splitter => "splitter",
            NodeKind::Customer => "customer",
        }
    }

    /// Human readable label used in tables and exports
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::DcOffice => "DC Office",
            NodeKind::Joint => "Network Joint",
            NodeKind::Olt => "OLT Terminal",
            NodeKind::Splitter => "Splitter",
            NodeKind::Customer => "Customer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub position: Coordinate,
    /// Id of the node one hop closer to the root. `None` for the root.
    pub parent_id: Option<String>,
    /// Kilometers from the parent
    pub segment_distance: f64,
    /// Kilometers from the root along the parent chain
    pub total_distance: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Coordinate) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            parent_id: None,
            segment_distance: 0.0,
            total_distance: 0.0,
        }
    }

    pub fn root(id: impl Into<String>, position: Coordinate) -> Self {
        Self::new(id, NodeKind::DcOffice, position)
    }

    pub fn connected_to(mut self, parent: impl Into<String>, segment: f64, total: f64) -> Self {
        self.parent_id = Some(parent.into());
        self.segment_distance = segment;
        self.total_distance = total;
        self
    }
}

/// A parent -> child link. Derived from the nodes, never stored in documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// Segment distance of the child, in kilometers
    pub distance: f64,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

#[derive(Debug, Clone)]
pub struct Network {
    map_id: String,
    name: String,
    root: String,
    terminal: Option<String>,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    declared_summary: Option<NetworkSummary>,
}

impl Network {
    /// Builds a network rooted at `root`. The remaining nodes keep their
    /// order; the first OLT among them becomes the terminal node.
    ///
    /// Node ids must be unique and distances non-negative. The tree shape
    /// itself is not checked here, see [`crate::validate`].
    pub fn new(
        map_id: impl Into<String>,
        name: impl Into<String>,
        root: Node,
        others: Vec<Node>,
    ) -> Result<Self> {
        let map_id = map_id.into();
        let root_id = root.id.clone();

        let mut nodes = Vec::with_capacity(others.len() + 1);
        nodes.push(root);
        nodes.extend(others);

        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            check_distance(node, "segment distance", node.segment_distance)?;
            check_distance(node, "total distance", node.total_distance)?;
            if index.insert(node.id.clone(), position).is_some() {
                return Err(TopologyError::DuplicateNode {
                    network: map_id,
                    node: node.id.clone(),
                });
            }
        }

        let terminal = nodes
            .iter()
            .skip(1)
            .find(|n| n.kind == NodeKind::Olt)
            .map(|n| n.id.clone());

        Ok(Self {
            map_id,
            name: name.into(),
            root: root_id,
            terminal,
            nodes,
            index,
            declared_summary: None,
        })
    }

    pub fn with_declared_summary(mut self, summary: NetworkSummary) -> Self {
        self.declared_summary = Some(summary);
        self
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn root(&self) -> &Node {
        // The root is always stored first.
        &self.nodes[0]
    }

    pub fn terminal_id(&self) -> Option<&str> {
        self.terminal.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        self.node(id)
            .and_then(|n| n.parent_id.as_deref())
            .and_then(|p| self.node(p))
    }

    pub fn declared_summary(&self) -> Option<&NetworkSummary> {
        self.declared_summary.as_ref()
    }

    /// Every edge whose parent resolves, in node order
    pub fn edges(&self) -> Vec<Edge> {
        self.nodes
            .iter()
            .filter(|n| n.id != self.root)
            .filter_map(|n| {
                let parent = self.node(n.parent_id.as_deref()?)?;
                Some(Edge::new(&parent.id, &n.id, n.segment_distance))
            })
            .collect()
    }
}

fn check_distance(node: &Node, field: &'static str, value: f64) -> Result<()> {
    if value < 0.0 || value.is_nan() {
        return Err(TopologyError::NegativeDistance {
            node: node.id.clone(),
            field,
            value,
        });
    }
    Ok(())
}

/// All networks of one topology document, in document order
#[derive(Debug, Clone, Default)]
pub struct NetworkSet {
    networks: Vec<Network>,
    declared_global: Option<GlobalSummary>,
}

impl NetworkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, network: Network) -> Result<()> {
        if self.get(network.map_id()).is_some() {
            return Err(TopologyError::DuplicateNetwork(network.map_id().to_string()));
        }
        self.networks.push(network);
        Ok(())
    }

    pub fn with_declared_global(mut self, summary: GlobalSummary) -> Self {
        self.declared_global = Some(summary);
        self
    }

    pub fn declared_global(&self) -> Option<&GlobalSummary> {
        self.declared_global.as_ref()
    }

    pub fn get(&self, map_id: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.map_id() == map_id)
    }

    pub fn first(&self) -> Option<&Network> {
        self.networks.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.networks.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.networks.iter().map(|n| n.map_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

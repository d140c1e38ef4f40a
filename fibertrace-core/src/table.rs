// Distance table: every node of a network ordered by distance from the root

use crate::model::{Coordinate, Network, Node, NodeKind};
use crate::units::DistanceUnit;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub point: String,
    pub kind: NodeKind,
    pub connected_to: Option<String>,
    pub segment_distance: f64,
    pub total_distance: f64,
    pub position: Coordinate,
}

impl TableRow {
    fn from_node(node: &Node) -> Self {
        Self {
            point: node.id.clone(),
            kind: node.kind,
            connected_to: node.parent_id.clone(),
            segment_distance: node.segment_distance,
            total_distance: node.total_distance,
            position: node.position,
        }
    }

    /// Row text as shown in the table, used for filtering
    pub fn render(&self, unit: DistanceUnit) -> String {
        format!(
            "{} {} {} {}",
            self.point,
            self.kind.label(),
            unit.format_with_label(self.segment_distance),
            unit.format_with_label(self.total_distance)
        )
    }
}

/// Root first, then every other node by ascending total distance (ties keep
/// document order), the terminal node last
pub fn ordered_nodes(network: &Network) -> Vec<&Node> {
    let root_id = network.root_id();
    let terminal_id = network.terminal_id();

    let mut middle: Vec<&Node> = network
        .nodes()
        .iter()
        .filter(|n| n.id != root_id && Some(n.id.as_str()) != terminal_id)
        .collect();
    middle.sort_by(|a, b| a.total_distance.total_cmp(&b.total_distance));

    let mut ordered = Vec::with_capacity(network.len());
    ordered.push(network.root());
    ordered.extend(middle);
    if let Some(terminal) = terminal_id.and_then(|id| network.node(id)) {
        ordered.push(terminal);
    }
    ordered
}

pub fn distance_table(network: &Network) -> Vec<TableRow> {
    ordered_nodes(network)
        .into_iter()
        .map(|node| {
            let mut row = TableRow::from_node(node);
            if node.id == network.root_id() {
                row.segment_distance = 0.0;
                row.total_distance = 0.0;
            }
            row
        })
        .collect()
}

/// Case-insensitive substring filter over the rendered rows. An empty query
/// keeps everything.
pub fn filter_rows<'a>(rows: &'a [TableRow], query: &str, unit: DistanceUnit) -> Vec<&'a TableRow> {
    let query = query.trim().to_lowercase();
    rows.iter()
        .filter(|row| query.is_empty() || row.render(unit).to_lowercase().contains(&query))
        .collect()
}

/// Nodes whose id contains `query` (case-insensitive), in table order
pub fn search_nodes<'a>(network: &'a Network, query: &str) -> Vec<&'a Node> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    ordered_nodes(network)
        .into_iter()
        .filter(|n| n.id.to_lowercase().contains(&query))
        .collect()
}

use colored::Colorize;
use fibertrace_core::highlight::HighlightRenderer;
use fibertrace_core::{DistanceUnit, Edge, Network};
use std::collections::HashSet;

/// Terminal drawing surface: keeps the highlighted edges and nodes and
/// prints the whole edge list with them marked
#[derive(Debug, Default)]
pub struct TextRenderer {
    edges: HashSet<(String, String)>,
    nodes: HashSet<String>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_edge_highlighted(&self, edge: &Edge) -> bool {
        self.edges.contains(&(edge.from.clone(), edge.to.clone()))
    }

    pub fn is_node_highlighted(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn is_blank(&self) -> bool {
        self.edges.is_empty() && self.nodes.is_empty()
    }

    /// One line per edge, in node order. Highlighted edges get a `▶` marker.
    pub fn render(&self, network: &Network, unit: DistanceUnit) -> String {
        let mut out = format!("{} ({})\n", network.name().bold(), network.map_id());

        let root = network.root_id();
        let root_line = format!("{} [{}]", root, network.root().kind.label());
        if self.is_node_highlighted(root) {
            out.push_str(&format!("  {} {}\n", "▶".green().bold(), root_line.green().bold()));
        } else {
            out.push_str(&format!("    {}\n", root_line));
        }

        for edge in network.edges() {
            let line = format!(
                "{} -> {}  {}",
                edge.from,
                edge.to,
                unit.format_with_label(edge.distance)
            );
            if self.is_edge_highlighted(&edge) {
                out.push_str(&format!("  {} {}\n", "▶".green().bold(), line.green().bold()));
            } else {
                out.push_str(&format!("    {}\n", line.dimmed()));
            }
        }
        out
    }
}

impl HighlightRenderer for TextRenderer {
    fn highlight_edge(&mut self, edge: &Edge) {
        self.edges.insert((edge.from.clone(), edge.to.clone()));
    }

    fn reset_edge(&mut self, edge: &Edge) {
        self.edges.remove(&(edge.from.clone(), edge.to.clone()));
    }

    fn highlight_node(&mut self, id: &str) {
        self.nodes.insert(id.to_string());
    }

    fn reset_node(&mut self, id: &str) {
        self.nodes.remove(id);
    }
}

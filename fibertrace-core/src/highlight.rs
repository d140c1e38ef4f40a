// Highlight bookkeeping for whatever draws the network (map widget, terminal, ...)

use crate::model::Edge;
use crate::path::Path;
use std::collections::BTreeSet;

/// A drawing surface that can mark edges and nodes as highlighted
pub trait HighlightRenderer {
    fn highlight_edge(&mut self, edge: &Edge);
    fn reset_edge(&mut self, edge: &Edge);
    fn highlight_node(&mut self, id: &str);
    fn reset_node(&mut self, id: &str);
}

/// Remembers what is currently highlighted so that it can be reset later,
/// even after the renderer has been handed a different path.
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    edges: Vec<Edge>,
    nodes: Vec<String>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the previous highlight, then highlights exactly `path`
    pub fn apply<R: HighlightRenderer + ?Sized>(&mut self, renderer: &mut R, path: &Path) {
        self.clear(renderer);

        for edge in path.edges() {
            renderer.highlight_edge(edge);
            self.edges.push(edge.clone());
        }
        for id in path.node_ids() {
            renderer.highlight_node(id);
            self.nodes.push(id.to_string());
        }
    }

    /// Resets everything this state highlighted. Calling it again is a no-op.
    pub fn clear<R: HighlightRenderer + ?Sized>(&mut self, renderer: &mut R) {
        for edge in self.edges.drain(..) {
            renderer.reset_edge(&edge);
        }
        for id in self.nodes.drain(..) {
            renderer.reset_node(&id);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.edges.is_empty() || !self.nodes.is_empty()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    HighlightEdge(String, String),
    ResetEdge(String, String),
    HighlightNode(String),
    ResetNode(String),
}

/// Keeps the highlighted sets in memory and logs every call
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    edges: BTreeSet<(String, String)>,
    nodes: BTreeSet<String>,
    events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_edge_highlighted(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&(from.to_string(), to.to_string()))
    }

    pub fn is_node_highlighted(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn highlighted_edges(&self) -> &BTreeSet<(String, String)> {
        &self.edges
    }

    pub fn highlighted_nodes(&self) -> &BTreeSet<String> {
        &self.nodes
    }

    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.events)
    }
}

impl HighlightRenderer for RecordingRenderer {
    fn highlight_edge(&mut self, edge: &Edge) {
        self.edges.insert((edge.from.clone(), edge.to.clone()));
        self.events
            .push(RenderEvent::HighlightEdge(edge.from.clone(), edge.to.clone()));
    }

    fn reset_edge(&mut self, edge: &Edge) {
        self.edges.remove(&(edge.from.clone(), edge.to.clone()));
        self.events
            .push(RenderEvent::ResetEdge(edge.from.clone(), edge.to.clone()));
    }

    fn highlight_node(&mut self, id: &str) {
        self.nodes.insert(id.to_string());
        self.events.push(RenderEvent::HighlightNode(id.to_string()));
    }

    fn reset_node(&mut self, id: &str) {
        self.nodes.remove(id);
        self.events.push(RenderEvent::ResetNode(id.to_string()));
    }
}

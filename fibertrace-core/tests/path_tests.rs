// Tests for path resolution

use fibertrace_core::model::{Coordinate, Edge, Network, Node, NodeKind};
use fibertrace_core::path::{PathBreak, PathOutcome, PathResolver, resolve_path};

fn origin() -> Coordinate {
    Coordinate::new(24.8, 93.6)
}

/// DC1 -> J1 (1.0 km) -> J2 (0.5 km) -> OLT (2.0 km)
fn chain_network() -> Network {
    Network::new(
        "net",
        "Chain",
        Node::root("DC1", origin()),
        vec![
            Node::new("J1", NodeKind::Joint, origin()).connected_to("DC1", 1.0, 1.0),
            Node::new("J2", NodeKind::Joint, origin()).connected_to("J1", 0.5, 1.5),
            Node::new("OLT", NodeKind::Olt, origin()).connected_to("J2", 2.0, 3.5),
        ],
    )
    .unwrap()
}

// ============================================================================
// Complete Paths
// ============================================================================

#[test]
fn test_path_to_terminal() {
    let network = chain_network();
    let outcome = resolve_path(&network, "OLT");

    assert!(outcome.is_complete());
    assert_eq!(
        outcome.edges(),
        &[
            Edge::new("DC1", "J1", 1.0),
            Edge::new("J1", "J2", 0.5),
            Edge::new("J2", "OLT", 2.0),
        ]
    );
    assert!((outcome.path().total_distance() - 3.5).abs() < 1e-9);
}

#[test]
fn test_path_to_root_is_empty() {
    let network = chain_network();
    let outcome = resolve_path(&network, "DC1");

    assert_eq!(outcome, PathOutcome::Complete(fibertrace_core::Path::empty("DC1")));
    assert!(outcome.edges().is_empty());
    assert_eq!(outcome.path().node_ids(), vec!["DC1"]);
}

#[test]
fn test_path_to_intermediate_joint() {
    let network = chain_network();
    let outcome = resolve_path(&network, "J2");

    assert!(outcome.is_complete());
    assert_eq!(outcome.edges().len(), 2);
    assert_eq!(outcome.edges().last().unwrap().to, "J2");
}

#[test]
fn test_last_edge_targets_node_for_every_non_root() {
    let network = chain_network();
    for node in network.nodes().iter().skip(1) {
        let outcome = resolve_path(&network, &node.id);
        assert!(outcome.is_complete(), "{} should reach the root", node.id);
        assert_eq!(outcome.edges().last().unwrap().to, node.id);
        assert_eq!(outcome.edges().first().unwrap().from, "DC1");
    }
}

#[test]
fn test_edges_follow_recorded_parents() {
    let network = chain_network();
    let outcome = resolve_path(&network, "OLT");

    for pair in outcome.edges().windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    for edge in outcome.edges() {
        let child = network.node(&edge.to).unwrap();
        assert_eq!(child.parent_id.as_deref(), Some(edge.from.as_str()));
    }
}

#[test]
fn test_node_ids_in_walk_order() {
    let network = chain_network();
    let outcome = resolve_path(&network, "OLT");
    assert_eq!(outcome.path().node_ids(), vec!["DC1", "J1", "J2", "OLT"]);
    assert!(outcome.path().contains_node("J1"));
    assert!(!outcome.path().contains_node("elsewhere"));
}

#[test]
fn test_resolution_is_idempotent() {
    let network = chain_network();
    let resolver = PathResolver::new(&network);
    let first = resolver.resolve("OLT");
    let second = resolver.resolve("OLT");
    assert_eq!(first, second);
}

// ============================================================================
// Degraded Paths
// ============================================================================

#[test]
fn test_dangling_parent_returns_partial() {
    let network = Network::new(
        "net",
        "Broken",
        Node::root("DC1", origin()),
        vec![
            Node::new("J1", NodeKind::Joint, origin()).connected_to("GHOST", 1.0, 1.0),
            Node::new("J2", NodeKind::Joint, origin()).connected_to("J1", 0.5, 1.5),
        ],
    )
    .unwrap();

    let outcome = resolve_path(&network, "J2");

    assert!(!outcome.is_complete());
    assert_eq!(outcome.edges(), &[Edge::new("J1", "J2", 0.5)]);
    assert_eq!(
        outcome.reason(),
        Some(&PathBreak::Dangling {
            node: "J1".to_string(),
            missing_parent: "GHOST".to_string(),
        })
    );
}

#[test]
fn test_dangling_parent_on_target_gives_empty_partial() {
    let network = Network::new(
        "net",
        "Broken",
        Node::root("DC1", origin()),
        vec![Node::new("J1", NodeKind::Joint, origin()).connected_to("GHOST", 1.0, 1.0)],
    )
    .unwrap();

    let outcome = resolve_path(&network, "J1");
    assert!(outcome.edges().is_empty());
    assert!(matches!(outcome.reason(), Some(PathBreak::Dangling { .. })));
}

#[test]
fn test_cycle_terminates() {
    let network = Network::new(
        "net",
        "Loop",
        Node::root("DC1", origin()),
        vec![
            Node::new("A", NodeKind::Joint, origin()).connected_to("B", 1.0, 1.0),
            Node::new("B", NodeKind::Joint, origin()).connected_to("A", 1.0, 2.0),
        ],
    )
    .unwrap();

    let outcome = resolve_path(&network, "A");

    assert!(!outcome.is_complete());
    assert_eq!(
        outcome.reason(),
        Some(&PathBreak::Cycle {
            at: "A".to_string()
        })
    );
    assert!(outcome.edges().len() <= network.len());
}

#[test]
fn test_orphan_node() {
    let network = Network::new(
        "net",
        "Orphan",
        Node::root("DC1", origin()),
        vec![Node::new("Lonely", NodeKind::Joint, origin())],
    )
    .unwrap();

    let outcome = resolve_path(&network, "Lonely");
    assert_eq!(
        outcome.reason(),
        Some(&PathBreak::Orphan {
            node: "Lonely".to_string()
        })
    );
}

#[test]
fn test_unknown_target() {
    let network = chain_network();
    let outcome = resolve_path(&network, "nowhere");

    assert_eq!(outcome.reason(), Some(&PathBreak::UnknownTarget));
    assert!(outcome.edges().is_empty());
    assert_eq!(outcome.path().target(), "nowhere");
}

#[test]
fn test_path_break_display() {
    let reason = PathBreak::Dangling {
        node: "J1".to_string(),
        missing_parent: "GHOST".to_string(),
    };
    assert_eq!(reason.to_string(), "'J1' is connected to unknown node 'GHOST'");
}

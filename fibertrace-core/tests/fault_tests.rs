// Tests for fault location

use fibertrace_core::fault::locate_fault;
use fibertrace_core::model::{Coordinate, Network, Node, NodeKind};
use fibertrace_core::wire::parse_document;

const NETVISION: &str = include_str!("fixtures/netvision.json");

fn netvision() -> Network {
    parse_document(NETVISION).unwrap().first().unwrap().clone()
}

#[test]
fn test_single_customer_points_at_its_splitter() {
    let report = locate_fault(&netvision(), &["0385-2450001"]);
    assert_eq!(report.common_upstream.as_deref(), Some("S1"));
    assert!(report.unknown.is_empty());
}

#[test]
fn test_customers_on_sibling_splitters() {
    let report = locate_fault(&netvision(), &["0385-2450002", "0385-2450003"]);
    assert_eq!(report.common_upstream.as_deref(), Some("S1"));
    assert_eq!(
        report.affected().collect::<Vec<_>>(),
        vec!["0385-2450002", "0385-2450003"]
    );
}

#[test]
fn test_splitter_and_its_customer() {
    // S1 is itself affected, so the shared upstream node is above it
    let report = locate_fault(&netvision(), &["S1", "0385-2450001"]);
    assert_eq!(report.common_upstream.as_deref(), Some("OLT-1"));
}

#[test]
fn test_unknown_and_duplicate_ids() {
    let report = locate_fault(
        &netvision(),
        &["0385-2450003", "0385-9999999", "0385-2450003"],
    );
    assert_eq!(report.unknown, vec!["0385-9999999".to_string()]);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.common_upstream.as_deref(), Some("S2"));
}

#[test]
fn test_no_ids() {
    let ids: [&str; 0] = [];
    let report = locate_fault(&netvision(), &ids);
    assert!(report.outcomes.is_empty());
    assert_eq!(report.common_upstream, None);
}

#[test]
fn test_broken_paths_are_ignored_for_upstream() {
    let here = Coordinate::new(0.0, 0.0);
    let network = Network::new(
        "net",
        "Partial",
        Node::root("DC", here),
        vec![
            Node::new("J1", NodeKind::Joint, here).connected_to("DC", 1.0, 1.0),
            Node::new("C1", NodeKind::Customer, here).connected_to("J1", 0.1, 1.1),
            Node::new("C2", NodeKind::Customer, here).connected_to("GHOST", 0.1, 0.1),
        ],
    )
    .unwrap();

    let report = locate_fault(&network, &["C1", "C2"]);
    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.outcomes[1].1.is_complete());
    assert_eq!(report.common_upstream.as_deref(), Some("J1"));
}

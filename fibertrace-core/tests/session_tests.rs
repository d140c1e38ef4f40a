// Tests for view state, highlighting and load tokens

use fibertrace_core::error::TopologyError;
use fibertrace_core::highlight::{HighlightState, RecordingRenderer, RenderEvent};
use fibertrace_core::path::resolve_path;
use fibertrace_core::session::{LoadApplied, ViewState};
use fibertrace_core::units::DistanceUnit;
use fibertrace_core::wire::parse_document;
use fibertrace_core::NetworkSet;

const NETWORKS: &str = include_str!("fixtures/networks.json");
const NETVISION: &str = include_str!("fixtures/netvision.json");

fn networks() -> NetworkSet {
    parse_document(NETWORKS).unwrap()
}

fn loaded_view(renderer: &mut RecordingRenderer) -> ViewState {
    let mut view = ViewState::new(DistanceUnit::Kilometers);
    let token = view.begin_load();
    assert_eq!(view.finish_load(token, networks(), renderer), LoadApplied::Applied);
    view
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_nothing_loaded() {
    let view = ViewState::default();
    assert!(matches!(view.current_network(), Err(TopologyError::NothingLoaded)));
}

#[test]
fn test_first_network_selected_by_default() {
    let mut renderer = RecordingRenderer::new();
    let view = loaded_view(&mut renderer);
    assert_eq!(view.current_network().unwrap().map_id(), "network_1");
}

#[test]
fn test_preferred_network_kept_when_present() {
    let mut renderer = RecordingRenderer::new();
    let mut view = ViewState::new(DistanceUnit::Kilometers).with_preferred_network("network_3");
    let token = view.begin_load();
    view.finish_load(token, networks(), &mut renderer);
    assert_eq!(view.current_network().unwrap().map_id(), "network_3");
}

#[test]
fn test_missing_preferred_network_falls_back() {
    let mut renderer = RecordingRenderer::new();
    let mut view = ViewState::new(DistanceUnit::Kilometers).with_preferred_network("network_9");
    let token = view.begin_load();
    view.finish_load(token, networks(), &mut renderer);
    assert_eq!(view.current_network().unwrap().map_id(), "network_1");
}

#[test]
fn test_stale_load_is_dropped() {
    let mut renderer = RecordingRenderer::new();
    let mut view = ViewState::default();

    let first = view.begin_load();
    let second = view.begin_load();
    assert!(!view.is_current_load(first));
    assert!(view.is_current_load(second));

    // The newer load lands first; the older one must not overwrite it.
    let single = parse_document(NETVISION).unwrap();
    assert_eq!(view.finish_load(second, single, &mut renderer), LoadApplied::Applied);
    assert_eq!(
        view.finish_load(first, networks(), &mut renderer),
        LoadApplied::Stale {
            token: first,
            latest: second
        }
    );
    assert_eq!(view.current_network().unwrap().map_id(), "network");
    assert_eq!(view.networks().unwrap().len(), 1);
}

#[test]
fn test_reload_clears_highlight() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);
    view.trace("BSNL Tower", &mut renderer).unwrap();
    assert!(view.highlight().is_active());

    let token = view.begin_load();
    view.finish_load(token, networks(), &mut renderer);
    assert!(!view.highlight().is_active());
    assert!(renderer.highlighted_edges().is_empty());
    assert!(renderer.highlighted_nodes().is_empty());
}

// ============================================================================
// Highlighting
// ============================================================================

#[test]
fn test_trace_highlights_exactly_the_path() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);

    let outcome = view.trace("Joint2", &mut renderer).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(renderer.highlighted_edges().len(), 3);
    assert!(renderer.is_edge_highlighted("DC1", "Joint01"));
    assert!(renderer.is_edge_highlighted("Joint1", "Joint2"));
    assert!(!renderer.is_edge_highlighted("Joint2", "Joint3"));
    assert!(renderer.is_node_highlighted("Joint2"));
}

#[test]
fn test_second_trace_resets_previous_edges() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);

    view.trace("BSNL Tower", &mut renderer).unwrap();
    assert_eq!(renderer.highlighted_edges().len(), 6);

    view.trace("Joint01", &mut renderer).unwrap();
    assert_eq!(renderer.highlighted_edges().len(), 1);
    assert!(renderer.is_edge_highlighted("DC1", "Joint01"));
    assert!(!renderer.is_node_highlighted("BSNL Tower"));
}

#[test]
fn test_clear_is_idempotent() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);
    view.trace("Joint3", &mut renderer).unwrap();

    view.clear_highlight(&mut renderer);
    renderer.take_events();
    view.clear_highlight(&mut renderer);
    assert!(renderer.events().is_empty());
    assert!(renderer.highlighted_edges().is_empty());
}

#[test]
fn test_apply_resets_before_highlighting() {
    let set = networks();
    let network = set.get("network_1").unwrap();
    let mut renderer = RecordingRenderer::new();
    let mut state = HighlightState::new();

    state.apply(&mut renderer, resolve_path(network, "Joint01").path());
    renderer.take_events();
    state.apply(&mut renderer, resolve_path(network, "Joint01").path());

    let events = renderer.take_events();
    assert_eq!(
        events.first(),
        Some(&RenderEvent::ResetEdge("DC1".to_string(), "Joint01".to_string()))
    );
    assert_eq!(
        events.last(),
        Some(&RenderEvent::HighlightNode("Joint01".to_string()))
    );
    assert!(renderer.is_edge_highlighted("DC1", "Joint01"));
}

#[test]
fn test_switching_network_clears_highlight() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);
    view.trace("BSNL Tower", &mut renderer).unwrap();

    let network = view.select_network("network_3", &mut renderer).unwrap();
    assert_eq!(network.root_id(), "Enterprise DC");
    assert!(renderer.highlighted_edges().is_empty());
    assert!(!view.highlight().is_active());
}

#[test]
fn test_select_unknown_network_keeps_state() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);
    view.trace("Joint1", &mut renderer).unwrap();

    let err = view.select_network("network_9", &mut renderer).unwrap_err();
    assert!(matches!(err, TopologyError::UnknownNetwork(ref id) if id == "network_9"));
    assert_eq!(view.current_network().unwrap().map_id(), "network_1");
    assert!(renderer.is_edge_highlighted("Joint01", "Joint1"));
}

// ============================================================================
// Units
// ============================================================================

#[test]
fn test_edge_labels_follow_unit() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);

    let labels = view.edge_labels().unwrap();
    let (edge, label) = labels.last().unwrap();
    assert_eq!(edge.to, "BSNL Tower");
    assert_eq!(label, "1.645 km");

    view.set_unit(view.unit().toggled());
    let labels = view.edge_labels().unwrap();
    assert_eq!(labels.last().unwrap().1, "1.022 mi");
}

#[test]
fn test_unit_change_keeps_highlight() {
    let mut renderer = RecordingRenderer::new();
    let mut view = loaded_view(&mut renderer);
    view.trace("BSNL Tower", &mut renderer).unwrap();

    view.set_unit(DistanceUnit::Miles);
    assert!(view.highlight().is_active());
    assert_eq!(view.table().unwrap().len(), 7);
}

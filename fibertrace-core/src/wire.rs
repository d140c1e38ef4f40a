// Topology JSON documents -> NetworkSet
//
// Two shapes are accepted: a collection (`{"networks": {...}, "globalSummary": {...}}`)
// and a bare network object at the top level.

use crate::error::{Result, TopologyError};
use crate::geo::great_circle_km;
use crate::model::{Coordinate, Network, NetworkSet, Node, NodeKind};
use crate::summary::{GlobalSummary, NetworkSummary};
use crate::validate::DISTANCE_TOLERANCE;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

const DEFAULT_MAP_ID: &str = "network";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNetwork {
    map_id: Option<String>,
    map_name: Option<String>,
    dc_office: RawPoint,
    #[serde(default)]
    joints: Vec<RawPoint>,
    olt: Option<RawPoint>,
    #[serde(default)]
    splitters: Vec<RawSplitter>,
    summary: Option<RawSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPoint {
    #[serde(alias = "name")]
    description: String,
    latitude: f64,
    longitude: f64,
    connected_to: Option<String>,
    segment_distance: Option<f64>,
    total_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSplitter {
    #[serde(alias = "name")]
    splitter: String,
    latitude: f64,
    longitude: f64,
    connected_to: Option<String>,
    segment_distance: Option<f64>,
    total_distance: Option<f64>,
    #[serde(default)]
    customers: Vec<RawCustomer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCustomer {
    #[serde(alias = "name")]
    landline: String,
    latitude: f64,
    longitude: f64,
    segment_distance: Option<f64>,
    total_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSummary {
    total_cable_length: f64,
    max_coverage: f64,
    total_points: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGlobalSummary {
    total_networks: usize,
    combined_cable_length: f64,
    total_points: usize,
    max_coverage_overall: f64,
}

/// A node whose distances may still be missing from the document
struct Pending {
    id: String,
    kind: NodeKind,
    position: Coordinate,
    parent: Option<String>,
    segment: Option<f64>,
    total: Option<f64>,
}

pub fn parse_document(json: &str) -> Result<NetworkSet> {
    let value: Value = serde_json::from_str(json)?;
    parse_value(value)
}

pub fn parse_value(value: Value) -> Result<NetworkSet> {
    let Value::Object(mut object) = value else {
        return Err(TopologyError::InvalidDocument(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    let mut set = NetworkSet::new();

    match object.remove("networks") {
        Some(Value::Object(networks)) => {
            for (key, raw) in networks {
                let raw: RawNetwork = serde_json::from_value(raw)?;
                set.insert(build_network(&key, raw)?)?;
            }
            if let Some(global) = object.remove("globalSummary") {
                let global: RawGlobalSummary = serde_json::from_value(global)?;
                set = set.with_declared_global(GlobalSummary {
                    total_networks: global.total_networks,
                    combined_cable_length: global.combined_cable_length,
                    total_points: global.total_points,
                    max_coverage_overall: global.max_coverage_overall,
                });
            }
        }
        Some(_) => {
            return Err(TopologyError::InvalidDocument(
                "\"networks\" must be an object keyed by network id".to_string(),
            ));
        }
        None => {
            let raw: RawNetwork = serde_json::from_value(Value::Object(object))?;
            set.insert(build_network(DEFAULT_MAP_ID, raw)?)?;
        }
    }

    debug!("Parsed topology document with {} network(s)", set.len());
    Ok(set)
}

fn build_network(key: &str, raw: RawNetwork) -> Result<Network> {
    let map_id = raw.map_id.unwrap_or_else(|| key.to_string());
    let name = raw.map_name.unwrap_or_else(|| map_id.clone());

    let root_id = raw.dc_office.description.clone();
    let mut pending = vec![Pending {
        id: root_id.clone(),
        kind: NodeKind::DcOffice,
        position: Coordinate::new(raw.dc_office.latitude, raw.dc_office.longitude),
        parent: None,
        segment: Some(0.0),
        total: Some(0.0),
    }];

    pending.extend(raw.joints.into_iter().map(|p| point(p, NodeKind::Joint)));

    let olt_id = raw.olt.as_ref().map(|o| o.description.clone());
    if let Some(olt) = raw.olt {
        pending.push(point(olt, NodeKind::Olt));
    }

    let splitter_default_parent = olt_id.unwrap_or_else(|| root_id.clone());
    for splitter in raw.splitters {
        let splitter_id = splitter.splitter;
        pending.push(Pending {
            id: splitter_id.clone(),
            kind: NodeKind::Splitter,
            position: Coordinate::new(splitter.latitude, splitter.longitude),
            parent: Some(
                splitter
                    .connected_to
                    .unwrap_or_else(|| splitter_default_parent.clone()),
            ),
            segment: splitter.segment_distance,
            total: splitter.total_distance,
        });
        for customer in splitter.customers {
            pending.push(Pending {
                id: customer.landline,
                kind: NodeKind::Customer,
                position: Coordinate::new(customer.latitude, customer.longitude),
                parent: Some(splitter_id.clone()),
                segment: customer.segment_distance,
                total: customer.total_distance,
            });
        }
    }

    let mut nodes = fill_distances(&map_id, pending)?.into_iter();
    let root = nodes
        .next()
        .ok_or_else(|| TopologyError::InvalidDocument(format!("network '{}' is empty", map_id)))?;

    let mut network = Network::new(map_id, name, root, nodes.collect())?;

    if let Some(summary) = raw.summary {
        network = network.with_declared_summary(NetworkSummary {
            total_cable_length: summary.total_cable_length,
            max_coverage: summary.max_coverage,
            total_points: summary.total_points,
        });
        let computed = NetworkSummary::compute(&network);
        if network
            .declared_summary()
            .is_some_and(|declared| declared.differs_from(&computed, DISTANCE_TOLERANCE))
        {
            warn!(
                "Network '{}' declares a summary that does not match its nodes",
                network.map_id()
            );
        }
    }

    Ok(network)
}

fn point(raw: RawPoint, kind: NodeKind) -> Pending {
    Pending {
        id: raw.description,
        kind,
        position: Coordinate::new(raw.latitude, raw.longitude),
        parent: raw.connected_to,
        segment: raw.segment_distance,
        total: raw.total_distance,
    }
}

/// Fills missing segment distances with the great-circle distance to the
/// parent and missing totals by accumulating segments down from the
/// nearest node whose total is known (the root, at worst). A chain that
/// breaks before reaching a known total accumulates from the break.
fn fill_distances(map_id: &str, pending: Vec<Pending>) -> Result<Vec<Node>> {
    let mut index = HashMap::with_capacity(pending.len());
    for (position, p) in pending.iter().enumerate() {
        if index.insert(p.id.as_str(), position).is_some() {
            return Err(TopologyError::DuplicateNode {
                network: map_id.to_string(),
                node: p.id.clone(),
            });
        }
    }

    let parent_of = |i: usize| -> Option<usize> {
        pending[i]
            .parent
            .as_deref()
            .and_then(|p| index.get(p).copied())
    };

    let segments: Vec<f64> = (0..pending.len())
        .map(|i| match (pending[i].segment, parent_of(i)) {
            (Some(segment), _) => segment,
            (None, Some(parent)) => great_circle_km(pending[parent].position, pending[i].position),
            (None, None) => 0.0,
        })
        .collect();

    let mut totals: Vec<Option<f64>> = pending.iter().map(|p| p.total).collect();
    for start in 0..pending.len() {
        if totals[start].is_some() {
            continue;
        }

        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(start);
        let mut base = 0.0;
        while let Some(i) = cursor {
            if let Some(total) = totals[i] {
                base = total;
                break;
            }
            if !seen.insert(i) {
                break;
            }
            chain.push(i);
            cursor = parent_of(i);
        }

        for &i in chain.iter().rev() {
            base += segments[i];
            totals[i] = Some(base);
        }
    }

    Ok(pending
        .into_iter()
        .zip(segments)
        .zip(totals)
        .map(|((p, segment), total)| Node {
            id: p.id,
            kind: p.kind,
            position: p.position,
            parent_id: p.parent,
            segment_distance: segment,
            total_distance: total.unwrap_or(segment),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_totals_from_root() {
        let json = r#"{
            "dcOffice": { "name": "DC", "latitude": 0.0, "longitude": 0.0 },
            "joints": [
                { "description": "J1", "latitude": 0.0, "longitude": 0.0,
                  "connectedTo": "DC", "segmentDistance": 1.0 },
                { "description": "J2", "latitude": 0.0, "longitude": 0.0,
                  "connectedTo": "J1", "segmentDistance": 0.5 }
            ]
        }"#;
        let set = parse_document(json).unwrap();
        let network = set.first().unwrap();
        assert_eq!(network.node("J1").unwrap().total_distance, 1.0);
        assert_eq!(network.node("J2").unwrap().total_distance, 1.5);
    }

    #[test]
    fn test_fill_totals_handles_cycles() {
        let json = r#"{
            "dcOffice": { "name": "DC", "latitude": 0.0, "longitude": 0.0 },
            "joints": [
                { "description": "A", "latitude": 0.0, "longitude": 0.0,
                  "connectedTo": "B", "segmentDistance": 1.0 },
                { "description": "B", "latitude": 0.0, "longitude": 0.0,
                  "connectedTo": "A", "segmentDistance": 2.0 }
            ]
        }"#;
        let set = parse_document(json).unwrap();
        let network = set.first().unwrap();
        assert!(network.node("A").unwrap().total_distance.is_finite());
        assert!(network.node("B").unwrap().total_distance.is_finite());
    }

    #[test]
    fn test_missing_segment_uses_great_circle() {
        let json = r#"{
            "dcOffice": { "name": "DC", "latitude": 0.0, "longitude": 0.0 },
            "joints": [
                { "description": "J1", "latitude": 1.0, "longitude": 0.0,
                  "connectedTo": "DC" }
            ]
        }"#;
        let set = parse_document(json).unwrap();
        let j1 = set.first().unwrap().node("J1").unwrap().clone();
        assert!((j1.segment_distance - 111.195).abs() < 0.001);
        assert_eq!(j1.segment_distance, j1.total_distance);
    }
}

// CSV export of distance tables

use crate::model::{Network, NetworkSet};
use crate::table::distance_table;
use crate::units::DistanceUnit;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub enum ExportScope<'a> {
    Network(&'a Network),
    All(&'a NetworkSet),
}

impl ExportScope<'_> {
    pub fn to_csv(&self, unit: DistanceUnit) -> String {
        match self {
            ExportScope::Network(network) => export_network_csv(network, unit),
            ExportScope::All(set) => export_all_csv(set, unit),
        }
    }

    /// `<Network_Name>_<date>.csv` or `all_networks_<date>.csv`. Whitespace
    /// and path separators in the name become underscores.
    pub fn file_name(&self, date: NaiveDate) -> String {
        let day = date.format("%Y-%m-%d");
        match self {
            ExportScope::Network(network) => {
                let stem: Vec<&str> = network
                    .name()
                    .split(|c: char| c.is_whitespace() || matches!(c, '/' | '\\'))
                    .filter(|part| !part.is_empty())
                    .collect();
                format!("{}_{}.csv", stem.join("_"), day)
            }
            ExportScope::All(_) => format!("all_networks_{}.csv", day),
        }
    }
}

fn header(unit: DistanceUnit) -> String {
    format!(
        "Point,Type,Connected To,Segment Distance ({u}),Total Distance ({u}),Latitude,Longitude",
        u = unit.label()
    )
}

fn network_rows(network: &Network, unit: DistanceUnit) -> Vec<String> {
    distance_table(network)
        .into_iter()
        .map(|row| {
            let is_root = row.point == network.root_id();
            let segment = if is_root {
                "-".to_string()
            } else {
                unit.format(row.segment_distance)
            };
            [
                csv_field(&row.point).into_owned(),
                row.kind.label().to_string(),
                csv_field(row.connected_to.as_deref().unwrap_or("")).into_owned(),
                segment,
                unit.format(row.total_distance),
                row.position.latitude.to_string(),
                row.position.longitude.to_string(),
            ]
            .join(",")
        })
        .collect()
}

pub fn export_network_csv(network: &Network, unit: DistanceUnit) -> String {
    let mut csv = header(unit);
    csv.push('\n');
    for line in network_rows(network, unit) {
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

/// Every network in document order, with a leading `Network` column
pub fn export_all_csv(set: &NetworkSet, unit: DistanceUnit) -> String {
    let mut csv = format!("Network,{}\n", header(unit));
    for network in set.iter() {
        let name = csv_field(network.name());
        for line in network_rows(network, unit) {
            csv.push_str(&name);
            csv.push(',');
            csv.push_str(&line);
            csv.push('\n');
        }
    }
    csv
}

pub fn save_export(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Quotes a field when it contains a delimiter, a quote or a line break
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

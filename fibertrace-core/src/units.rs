use serde::{Deserialize, Serialize};

/// Miles per kilometer
pub const KM_TO_MILES: f64 = 0.621371;

/// Display unit for every distance shown to the user. Topology data is
/// always stored in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "km", alias = "kilometers")]
    Kilometers,
    #[serde(rename = "mi", alias = "miles")]
    Miles,
}

impl DistanceUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Some(DistanceUnit::Kilometers),
            "mi" | "miles" => Some(DistanceUnit::Miles),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    pub fn convert(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km * KM_TO_MILES,
        }
    }

    /// Converted value with three decimals, no unit label
    pub fn format(&self, km: f64) -> String {
        format!("{:.3}", self.convert(km))
    }

    pub fn format_with_label(&self, km: f64) -> String {
        format!("{} {}", self.format(km), self.label())
    }

    pub fn toggled(&self) -> Self {
        match self {
            DistanceUnit::Kilometers => DistanceUnit::Miles,
            DistanceUnit::Miles => DistanceUnit::Kilometers,
        }
    }
}

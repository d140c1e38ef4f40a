// Settings from the optional JSON config file, merged with command-line flags

use anyhow::{Context, Result, anyhow};
use fibertrace_core::DistanceUnit;
use fibertrace_net::TopologySource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/fibertrace/config.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REDIRECTS: &str = "redirects.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: Option<String>,
    pub network: Option<String>,
    pub unit: Option<DistanceUnit>,
    pub timeout_secs: Option<u64>,
    pub redirects: Option<String>,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid config file")
    }

    /// Reads `path`. A missing file yields the defaults unless `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                return Err(anyhow!("Config file {} does not exist", path.display()));
            }
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Self::from_json(&json)
    }

    /// An explicit `--config` path must exist; the default location may not
    pub fn load_from(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(&expand_path(path), true),
            None => Self::load(&expand_path(DEFAULT_CONFIG_PATH), false),
        }
    }
}

/// Values given on the command line. Each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source: Option<String>,
    pub network: Option<String>,
    pub unit: Option<DistanceUnit>,
    pub redirects: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: Option<String>,
    pub network: Option<String>,
    pub unit: DistanceUnit,
    pub timeout_secs: u64,
    pub redirects: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(CliOverrides::default(), Config::default())
    }
}

impl Settings {
    pub fn resolve(cli: CliOverrides, config: Config) -> Self {
        Self {
            source: cli.source.or(config.source),
            network: cli.network.or(config.network),
            unit: cli.unit.or(config.unit).unwrap_or_default(),
            timeout_secs: config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            redirects: cli.redirects.unwrap_or_else(|| {
                expand_path(config.redirects.as_deref().unwrap_or(DEFAULT_REDIRECTS))
            }),
        }
    }

    /// The topology source, with `~` expanded for local paths
    pub fn topology_source(&self) -> Result<TopologySource> {
        let raw = self.source.as_deref().ok_or_else(|| {
            anyhow!("No topology source given (use --source or set \"source\" in the config file)")
        })?;
        let source = TopologySource::parse(&shellexpand::tilde(raw))?;
        Ok(source)
    }
}

pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

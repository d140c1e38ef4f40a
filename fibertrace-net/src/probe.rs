// Front-end health probing: try each configured target in order and hand
// off to the first one that answers with the expected status.

use crate::error::{NetError, Result};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hand-off delay used when a target carries none, or an unusable one
pub const DEFAULT_DELAY_MS: u64 = 500;

pub type ProgressCallback = Arc<dyn Fn(usize, &ProbeAttempt) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTarget {
    #[serde(default)]
    pub url: String,
    /// Milliseconds to wait before handing off to this target once it is up
    #[serde(default = "default_delay", deserialize_with = "lenient_delay")]
    pub delay: u64,
}

impl ProbeTarget {
    pub fn new(url: impl Into<String>, delay: u64) -> Self {
        Self {
            url: url.into(),
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }
}

fn default_delay() -> u64 {
    DEFAULT_DELAY_MS
}

/// Accepts numbers and numeric strings. Zero, negative and non-numeric
/// values fall back to the default.
fn lenient_delay<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let millis = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(millis
        .filter(|ms| ms.is_finite() && *ms >= 1.0)
        .map(|ms| ms.round() as u64)
        .unwrap_or(DEFAULT_DELAY_MS))
}

/// Contents of `redirects.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub redirects: Vec<ProbeTarget>,
}

impl ProbeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        debug!("Loading probe targets from {}", path.display());
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeAttempt {
    pub url: String,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl ProbeAttempt {
    fn with_status(url: &str, status: u16) -> Self {
        Self {
            url: url.to_string(),
            status: Some(status),
            error: None,
        }
    }

    fn with_error(url: &str, error: String) -> Self {
        Self {
            url: url.to_string(),
            status: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected {
        target: ProbeTarget,
        attempts: Vec<ProbeAttempt>,
    },
    AllDown {
        attempts: Vec<ProbeAttempt>,
    },
}

impl ProbeOutcome {
    pub fn attempts(&self) -> &[ProbeAttempt] {
        match self {
            ProbeOutcome::Connected { attempts, .. } | ProbeOutcome::AllDown { attempts } => attempts,
        }
    }

    pub fn target(&self) -> Option<&ProbeTarget> {
        match self {
            ProbeOutcome::Connected { target, .. } => Some(target),
            ProbeOutcome::AllDown { .. } => None,
        }
    }
}

pub struct Prober {
    client: Client,
    expected_status: u16,
    progress_callback: Option<ProgressCallback>,
}

impl Prober {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("fibertrace-probe/0.1 (https://github.com/trapdoorsec/fibertrace)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            expected_status: 200,
            progress_callback: None,
        })
    }

    pub fn with_expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Probes `targets` in order and stops at the first healthy one
    pub async fn probe(&self, targets: &[ProbeTarget]) -> Result<ProbeOutcome> {
        if targets.is_empty() {
            return Err(NetError::NoTargets);
        }

        info!("Probing {} target(s)", targets.len());
        let mut attempts = Vec::with_capacity(targets.len());

        for (index, target) in targets.iter().enumerate() {
            let attempt = self.attempt(target.url.trim()).await;

            if let Some(cb) = &self.progress_callback {
                cb(index, &attempt);
            }

            let healthy = attempt.status == Some(self.expected_status);
            attempts.push(attempt);

            if healthy {
                info!("Target #{} ({}) is up", index + 1, target.url);
                return Ok(ProbeOutcome::Connected {
                    target: target.clone(),
                    attempts,
                });
            }
        }

        warn!("All {} probe target(s) are down", targets.len());
        Ok(ProbeOutcome::AllDown { attempts })
    }

    async fn attempt(&self, url: &str) -> ProbeAttempt {
        if url.is_empty() {
            return ProbeAttempt::with_error(url, "empty URL".to_string());
        }

        debug!("Probing {}", url);
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if status != self.expected_status {
                    warn!("{} responded with {}", url, status);
                }
                ProbeAttempt::with_status(url, status)
            }
            Err(e) => {
                warn!("No response from {}: {}", url, e);
                ProbeAttempt::with_error(url, e.to_string())
            }
        }
    }
}

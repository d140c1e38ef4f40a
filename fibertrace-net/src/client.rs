use crate::error::{NetError, Result};
use crate::source::TopologySource;
use fibertrace_core::NetworkSet;
use fibertrace_core::wire::parse_document;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "fibertrace/0.1 (https://github.com/trapdoorsec/fibertrace)";

/// Fetches and parses topology documents. One instance can serve any number
/// of loads; it holds a pooled HTTP client.
pub struct TopologyClient {
    client: Client,
}

impl TopologyClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, source: &TopologySource) -> Result<NetworkSet> {
        let body = match source {
            TopologySource::Remote(url) => self.get_text(url.as_str()).await?,
            TopologySource::Local(path) => {
                debug!("Reading topology from {}", path.display());
                tokio::fs::read_to_string(path).await?
            }
        };

        let networks = parse_document(&body)?;
        info!("Fetched {} network(s) from {}", networks.len(), source);
        Ok(networks)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

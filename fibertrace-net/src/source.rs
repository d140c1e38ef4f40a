use crate::error::{NetError, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Where a topology document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologySource {
    Remote(Url),
    Local(PathBuf),
}

impl TopologySource {
    /// `http://` and `https://` strings are URLs, anything else is a file path
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|e| NetError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
            return Ok(TopologySource::Remote(url));
        }
        if trimmed.is_empty() {
            return Err(NetError::InvalidUrl("empty topology source".to_string()));
        }
        Ok(TopologySource::Local(PathBuf::from(trimmed)))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TopologySource::Remote(_))
    }
}

impl fmt::Display for TopologySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologySource::Remote(url) => write!(f, "{}", url),
            TopologySource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        let source = TopologySource::parse("https://noc.example.net/networks.json").unwrap();
        assert!(source.is_remote());
        assert_eq!(source.to_string(), "https://noc.example.net/networks.json");
    }

    #[test]
    fn test_parse_local() {
        let source = TopologySource::parse("data/networks.json").unwrap();
        assert_eq!(
            source,
            TopologySource::Local(PathBuf::from("data/networks.json"))
        );
    }

    #[test]
    fn test_parse_broken_url() {
        assert!(matches!(
            TopologySource::parse("http://"),
            Err(NetError::InvalidUrl(_))
        ));
        assert!(matches!(
            TopologySource::parse("  "),
            Err(NetError::InvalidUrl(_))
        ));
    }
}

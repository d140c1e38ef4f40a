use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{url} responded with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Topology error: {0}")]
    TopologyError(#[from] fibertrace_core::TopologyError),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No probe targets configured")]
    NoTargets,
}

pub type Result<T> = std::result::Result<T, NetError>;

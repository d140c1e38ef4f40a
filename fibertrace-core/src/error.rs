use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid topology document: {0}")]
    InvalidDocument(String),

    #[error("Duplicate node '{node}' in network '{network}'")]
    DuplicateNode { network: String, node: String },

    #[error("Duplicate network id: {0}")]
    DuplicateNetwork(String),

    #[error("Negative {field} on node '{node}': {value}")]
    NegativeDistance {
        node: String,
        field: &'static str,
        value: f64,
    },

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("No topology loaded")]
    NothingLoaded,
}

pub type Result<T> = std::result::Result<T, TopologyError>;

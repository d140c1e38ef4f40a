pub mod client;
pub mod error;
pub mod probe;
pub mod source;

pub use client::TopologyClient;
pub use error::NetError;
pub use probe::{ProbeAttempt, ProbeConfig, ProbeOutcome, ProbeTarget, Prober};
pub use source::TopologySource;

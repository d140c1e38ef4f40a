pub mod error;
pub mod export;
pub mod fault;
pub mod geo;
pub mod highlight;
pub mod model;
pub mod path;
pub mod session;
pub mod summary;
pub mod table;
pub mod units;
pub mod validate;
pub mod wire;

pub use error::TopologyError;
pub use highlight::{HighlightRenderer, HighlightState, RecordingRenderer};
pub use model::{Coordinate, Edge, Network, NetworkSet, Node, NodeKind};
pub use path::{Path, PathBreak, PathOutcome, PathResolver, resolve_path};
pub use session::{LoadApplied, LoadToken, ViewState};
pub use units::DistanceUnit;
pub use wire::parse_document;

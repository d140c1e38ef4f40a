pub mod config;
pub mod handlers;
pub mod render;

pub use config::{CliOverrides, Config, Settings};
pub use render::TextRenderer;

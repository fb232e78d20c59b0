#[allow(clippy::module_inception)]
pub mod config;
pub mod settings;

pub use config::*;
pub use settings::*;

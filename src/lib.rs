pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod menu;
pub mod models;
pub mod reader;
pub mod render;
pub mod traits;
pub mod utils;
pub mod workflow;

pub use config::{Cli, Config, Location};
pub use error::{Error, Result};
pub use menu::Menu;
pub use workflow::{AnalysisReport, Workflow};

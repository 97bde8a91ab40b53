pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod templates;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{ExportConfig, TomlConfig};

pub use adapters::storage::LocalStorage;
pub use core::{engine::ExportEngine, pipeline::ReactTailwindPipeline};
pub use domain::model::{ExportRequest, Layout, LayoutElement};
pub use utils::error::{ExportError, Result};

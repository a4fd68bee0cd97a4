pub mod bootstrap;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use bootstrap::{BootstrapConfig, BootstrapReport, Bootstrapper};
pub use config::{cli::LocalStorage, ExportSettings};
pub use crate::core::{engine::ExportEngine, pipeline::ThreadPipeline};
pub use utils::error::{ExporterError, Result};

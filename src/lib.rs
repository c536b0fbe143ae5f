pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, CliConfig};

pub use core::{
    dataset::Dataset, engine::DashboardEngine, pipeline::DashboardPipeline,
    session::DashboardSession,
};
pub use utils::error::{DashboardError, Result};

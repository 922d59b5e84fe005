pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{etl::DashboardEngine, pipeline::DashboardPipeline};
pub use domain::model::{
    AggregateRow, AggregationSpec, ChartSpec, FilterSpec, GenderFilter, KpiSpec, PlatformFilter,
    Record, Reducer, Scope, ValueSource,
};
pub use utils::error::{PipelineError, Result};

pub mod aggregate;
pub mod etl;
pub mod filter;
pub mod pipeline;

pub use crate::domain::model::{DashboardBundle, Record};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

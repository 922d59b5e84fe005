use crate::domain::model::{ChartSpec, DashboardBundle, FilterSpec, KpiSpec, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// The user's sidebar selections, rebuilt on every run.
    fn filter_spec(&self) -> FilterSpec;
    fn kpi_specs(&self) -> Vec<KpiSpec>;
    fn chart_specs(&self) -> Vec<ChartSpec>;
    /// Which files go into the output bundle ("kpis", "charts", "filtered").
    fn output_formats(&self) -> Vec<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<DashboardBundle>;
    async fn load(&self, bundle: DashboardBundle) -> Result<String>;
}

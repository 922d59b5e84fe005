use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives one extract -> transform -> load run and returns the output path.
pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting dashboard pipeline...");

        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.len());
        self.monitor.log_stats("extract");

        tracing::info!("Transforming data...");
        let bundle = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Computed {} KPIs and {} charts over {}/{} records",
            bundle.kpis.len(),
            bundle.charts.len(),
            bundle.filtered_rows,
            bundle.total_rows
        );
        self.monitor.log_stats("transform");

        tracing::info!("Loading output bundle...");
        let output_path = self.pipeline.load(bundle).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

use crate::core::aggregate::{aggregate, reduce_kpi};
use crate::core::filter::filter_records;
use crate::core::{ConfigProvider, DashboardBundle, Pipeline, Record, Storage};
use crate::domain::model::{ChartData, FieldValue, KpiValue, Scope};
use crate::utils::error::Result;
use std::collections::BTreeSet;

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// Render rows back to CSV for the presentation layer. Record maps are
    /// unordered, so columns come out sorted by name.
    fn render_csv(records: &[Record]) -> Result<String> {
        let columns: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.fields.keys().map(String::as_str))
            .collect();
        let columns: Vec<&str> = columns.into_iter().collect();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&columns)?;
        for record in records {
            let row: Vec<String> = columns
                .iter()
                .map(|col| {
                    record
                        .get(col)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let path = self.config.source_path();
        tracing::debug!("Reading source CSV: {}", path);
        let bytes = self.storage.read_file(path).await?;

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        tracing::debug!("Source columns: {:?}", headers);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let fields = headers
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.clone(), FieldValue::from_csv_cell(cell)))
                .collect();
            records.push(Record { fields });
        }

        tracing::info!("📥 Extracted {} records from {}", records.len(), path);
        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<DashboardBundle> {
        let filter_spec = self.config.filter_spec();
        let filtered = filter_records(&data, &filter_spec);
        tracing::info!(
            "🔄 Filter retained {}/{} records",
            filtered.len(),
            data.len()
        );

        let mut kpis = Vec::new();
        for spec in self.config.kpi_specs() {
            let value = reduce_kpi(&filtered, &spec)?;
            kpis.push(KpiValue {
                label: spec.label,
                value,
            });
        }

        let mut charts = Vec::new();
        for spec in self.config.chart_specs() {
            // Each chart declares which snapshot it aggregates over.
            let snapshot: &[Record] = match spec.scope {
                Scope::Filtered => &filtered,
                Scope::Global => &data,
            };
            let rows = aggregate(snapshot, &spec.aggregation)?;
            tracing::debug!("Chart '{}': {} groups", spec.name, rows.len());
            charts.push(ChartData {
                name: spec.name,
                scope: spec.scope,
                rows,
            });
        }

        let filtered_csv = Self::render_csv(&filtered)?;

        Ok(DashboardBundle {
            kpis,
            charts,
            filtered_csv,
            total_rows: data.len(),
            filtered_rows: filtered.len(),
        })
    }

    async fn load(&self, bundle: DashboardBundle) -> Result<String> {
        use std::io::Write;
        use zip::write::{FileOptions, ZipWriter};

        let filename = "dashboard_data.zip";
        let output_path = format!("{}/{}", self.config.output_path(), filename);
        let formats = self.config.output_formats();

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for format in &formats {
                match format.as_str() {
                    "kpis" => {
                        zip.start_file::<_, ()>("kpis.json", FileOptions::default())?;
                        zip.write_all(serde_json::to_string_pretty(&bundle.kpis)?.as_bytes())?;
                    }
                    "charts" => {
                        zip.start_file::<_, ()>("charts.json", FileOptions::default())?;
                        zip.write_all(serde_json::to_string_pretty(&bundle.charts)?.as_bytes())?;
                    }
                    "filtered" => {
                        zip.start_file::<_, ()>("filtered.csv", FileOptions::default())?;
                        zip.write_all(bundle.filtered_csv.as_bytes())?;
                    }
                    other => {
                        tracing::warn!("🔶 Unsupported output format: {}", other);
                    }
                }
            }

            zip.start_file::<_, ()>("metadata.json", FileOptions::default())?;
            let metadata = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "source": self.config.source_path(),
                "total_rows": bundle.total_rows,
                "filtered_rows": bundle.filtered_rows,
            });
            zip.write_all(serde_json::to_string_pretty(&metadata)?.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing bundle ({} bytes) to storage", zip_data.len());
        self.storage.write_file(filename, &zip_data).await?;

        tracing::info!("💾 Dashboard bundle saved to {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AggregationSpec, ChartSpec, FilterSpec, GenderFilter, KpiSpec, PlatformFilter, Reducer,
        ValueSource,
    };
    use crate::utils::error::PipelineError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                PipelineError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source_path: String,
        output_path: String,
        filter: FilterSpec,
        kpis: Vec<KpiSpec>,
        charts: Vec<ChartSpec>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                source_path: "data.csv".to_string(),
                output_path: "test_output".to_string(),
                filter: FilterSpec::all(),
                kpis: vec![KpiSpec {
                    label: "Total Engagement".to_string(),
                    field: "Engagement".to_string(),
                    reducer: Reducer::Sum,
                }],
                charts: vec![ChartSpec {
                    name: "Engagement by Platform".to_string(),
                    scope: Scope::Filtered,
                    aggregation: AggregationSpec {
                        group_key: "Platform".to_string(),
                        value: ValueSource::Field("Engagement".to_string()),
                        reducer: Reducer::Sum,
                    },
                }],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_path(&self) -> &str {
            &self.source_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn filter_spec(&self) -> FilterSpec {
            self.filter.clone()
        }

        fn kpi_specs(&self) -> Vec<KpiSpec> {
            self.kpis.clone()
        }

        fn chart_specs(&self) -> Vec<ChartSpec> {
            self.charts.clone()
        }

        fn output_formats(&self) -> Vec<String> {
            vec![
                "kpis".to_string(),
                "charts".to_string(),
                "filtered".to_string(),
            ]
        }
    }

    const SAMPLE_CSV: &[u8] = b"Gender,Age,Platform,Engagement\n\
F,25,X,10\n\
F,30,X,20\n\
M,60,Y,5\n";

    #[tokio::test]
    async fn test_extract_parses_typed_cells() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());

        let records = pipeline.extract().await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("Age"), Some(&FieldValue::Int(25)));
        assert_eq!(
            records[2].get("Gender"),
            Some(&FieldValue::Str("M".to_string()))
        );
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let storage = MockStorage::new();
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, PipelineError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_computes_kpis_and_charts() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());

        let records = pipeline.extract().await.unwrap();
        let bundle = pipeline.transform(records).await.unwrap();

        assert_eq!(bundle.total_rows, 3);
        assert_eq!(bundle.filtered_rows, 3);
        assert_eq!(bundle.kpis[0].value, Some(35.0));

        let chart = &bundle.charts[0];
        assert_eq!(chart.rows.len(), 2);
        assert_eq!(chart.rows[0].key, "X");
        assert_eq!(chart.rows[0].value, 30.0);
    }

    #[tokio::test]
    async fn test_transform_respects_chart_scope() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let mut config = MockConfig::new();
        config.filter = FilterSpec {
            gender: GenderFilter::Exact("F".to_string()),
            age_min: 0,
            age_max: 100,
            platforms: PlatformFilter::Any,
        };
        config.charts.push(ChartSpec {
            name: "Engagement by Platform (all users)".to_string(),
            scope: Scope::Global,
            aggregation: config.charts[0].aggregation.clone(),
        });
        let pipeline = DashboardPipeline::new(storage, config);

        let records = pipeline.extract().await.unwrap();
        let bundle = pipeline.transform(records).await.unwrap();

        assert_eq!(bundle.filtered_rows, 2);
        // Filtered chart sees only the two F/X rows.
        assert_eq!(bundle.charts[0].rows.len(), 1);
        // Global chart still sees both platforms.
        assert_eq!(bundle.charts[1].rows.len(), 2);
    }

    #[tokio::test]
    async fn test_transform_empty_filter_result_is_not_a_fault() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let mut config = MockConfig::new();
        config.filter.age_min = 90;
        config.filter.age_max = 10;
        let pipeline = DashboardPipeline::new(storage, config);

        let records = pipeline.extract().await.unwrap();
        let bundle = pipeline.transform(records).await.unwrap();

        assert_eq!(bundle.filtered_rows, 0);
        assert!(bundle.charts[0].rows.is_empty());
        // Sum over nothing is zero, not an error.
        assert_eq!(bundle.kpis[0].value, Some(0.0));
    }

    #[tokio::test]
    async fn test_transform_missing_chart_column_propagates() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let mut config = MockConfig::new();
        config.charts[0].aggregation.group_key = "DeviceType".to_string();
        let pipeline = DashboardPipeline::new(storage, config);

        let records = pipeline.extract().await.unwrap();
        let err = pipeline.transform(records).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_zip_bundle() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let pipeline = DashboardPipeline::new(storage.clone(), MockConfig::new());

        let records = pipeline.extract().await.unwrap();
        let bundle = pipeline.transform(records).await.unwrap();
        let output_path = pipeline.load(bundle).await.unwrap();

        assert_eq!(output_path, "test_output/dashboard_data.zip");

        let zip_bytes = storage.get_file("dashboard_data.zip").await.unwrap();
        let cursor = std::io::Cursor::new(zip_bytes);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["charts.json", "filtered.csv", "kpis.json", "metadata.json"]
        );

        let mut kpis_json = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("kpis.json").unwrap(),
            &mut kpis_json,
        )
        .unwrap();
        let kpis: Vec<KpiValue> = serde_json::from_str(&kpis_json).unwrap();
        assert_eq!(kpis[0].label, "Total Engagement");
        assert_eq!(kpis[0].value, Some(35.0));
    }

    #[tokio::test]
    async fn test_render_csv_round_trips_filtered_rows() {
        let storage = MockStorage::new();
        storage.put("data.csv", SAMPLE_CSV).await;
        let pipeline = DashboardPipeline::new(storage, MockConfig::new());

        let records = pipeline.extract().await.unwrap();
        let bundle = pipeline.transform(records).await.unwrap();

        let mut reader = csv::Reader::from_reader(bundle.filtered_csv.as_bytes());
        assert_eq!(reader.records().count(), 3);
    }
}

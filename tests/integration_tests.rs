use engagement_etl::{
    CliConfig, DashboardEngine, DashboardPipeline, LocalStorage,
};
use std::io::Write;
use tempfile::TempDir;

const SAMPLE_CSV: &str = "\
Gender,Age,Platform,Engagement,Total Time Spent,ProductivityLoss,Addiction Level,Income,Debt,Video Category,Time Spent On Video,Profession,Satisfaction,DeviceType,Video Length,Scroll Rate,Number of Sessions
Female,25,TikTok,100,12,4,6,40000,2000,Comedy,20,Engineer,7,Smartphone,10,55,5
Female,30,Instagram,80,9,3,5,0,1500,Vlogs,15,Artist,8,Tablet,12,40,3
Male,60,TikTok,40,5,2,3,60000,0,News,8,Manager,5,Smartphone,6,20,2
Male,17,YouTube,120,20,6,8,1000,500,Gaming,35,Student,9,Computer,25,70,9
";

fn write_sample_csv(dir: &TempDir) -> String {
    let path = dir.path().join("engagement.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
    path.to_str().unwrap().to_string()
}

fn config(input: String, output_path: String) -> CliConfig {
    CliConfig {
        input,
        output_path,
        gender: None,
        age_min: 0,
        age_max: 100,
        platforms: vec![],
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_unfiltered_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(&temp_dir);
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config(input, output_path.clone());
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config);
    let engine = DashboardEngine::new(pipeline);

    let result = engine.run().await;
    assert!(result.is_ok());

    let output_file_path = result.unwrap();
    assert!(output_file_path.contains("dashboard_data.zip"));

    let full_path = std::path::Path::new(&output_path).join("dashboard_data.zip");
    assert!(full_path.exists());

    let zip_data = std::fs::read(&full_path).unwrap();
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor).unwrap();

    let file_names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();

    assert!(file_names.contains(&"kpis.json".to_string()));
    assert!(file_names.contains(&"charts.json".to_string()));
    assert!(file_names.contains(&"filtered.csv".to_string()));
    assert!(file_names.contains(&"metadata.json".to_string()));

    // KPI values over the whole table.
    let mut kpis_json = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("kpis.json").unwrap(), &mut kpis_json)
        .unwrap();
    let kpis: Vec<serde_json::Value> = serde_json::from_str(&kpis_json).unwrap();
    assert_eq!(kpis.len(), 3);
    assert_eq!(kpis[0]["label"], "Total Time Spent (hours)");
    assert_eq!(kpis[0]["value"], 46.0);

    // Every default chart is present.
    let mut charts_json = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("charts.json").unwrap(),
        &mut charts_json,
    )
    .unwrap();
    let charts: Vec<serde_json::Value> = serde_json::from_str(&charts_json).unwrap();
    assert_eq!(charts.len(), 9);
}

#[tokio::test]
async fn test_end_to_end_with_sidebar_filters() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(&temp_dir);
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mut config = config(input, output_path.clone());
    config.gender = Some("Female".to_string());
    config.age_min = 20;
    config.age_max = 50;
    config.platforms = vec!["TikTok".to_string(), "Instagram".to_string()];

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config);
    let engine = DashboardEngine::new(pipeline);

    engine.run().await.unwrap();

    let full_path = std::path::Path::new(&output_path).join("dashboard_data.zip");
    let zip_data = std::fs::read(&full_path).unwrap();
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor).unwrap();

    // Both Female rows pass; the filtered export reflects that.
    let mut filtered_csv = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("filtered.csv").unwrap(),
        &mut filtered_csv,
    )
    .unwrap();
    let mut reader = csv::Reader::from_reader(filtered_csv.as_bytes());
    assert_eq!(reader.records().count(), 2);

    let mut metadata_json = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("metadata.json").unwrap(),
        &mut metadata_json,
    )
    .unwrap();
    let metadata: serde_json::Value = serde_json::from_str(&metadata_json).unwrap();
    assert_eq!(metadata["total_rows"], 4);
    assert_eq!(metadata["filtered_rows"], 2);

    // The global-scope chart still aggregates all four rows' platforms.
    let mut charts_json = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("charts.json").unwrap(),
        &mut charts_json,
    )
    .unwrap();
    let charts: Vec<serde_json::Value> = serde_json::from_str(&charts_json).unwrap();
    let global_chart = charts
        .iter()
        .find(|c| c["name"] == "Engagement by Platform")
        .unwrap();
    assert_eq!(global_chart["scope"], "global");
    assert_eq!(global_chart["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_end_to_end_no_match_still_produces_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(&temp_dir);
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mut config = config(input, output_path.clone());
    // Inverted range: legal spec, empty result.
    config.age_min = 90;
    config.age_max = 10;

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = DashboardPipeline::new(storage, config);
    let engine = DashboardEngine::new(pipeline);

    let result = engine.run().await;
    assert!(result.is_ok());

    let full_path = std::path::Path::new(&output_path).join("dashboard_data.zip");
    let zip_data = std::fs::read(&full_path).unwrap();
    let cursor = std::io::Cursor::new(zip_data);
    let mut archive = zip::ZipArchive::new(cursor).unwrap();

    let mut kpis_json = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("kpis.json").unwrap(), &mut kpis_json)
        .unwrap();
    let kpis: Vec<serde_json::Value> = serde_json::from_str(&kpis_json).unwrap();
    // Sum over nothing is 0; means over nothing are null.
    assert_eq!(kpis[0]["value"], 0.0);
    assert!(kpis[1]["value"].is_null());
    assert!(kpis[2]["value"].is_null());
}

#[tokio::test]
async fn test_end_to_end_missing_input_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config("does-not-exist.csv".to_string(), output_path.clone());
    let storage = LocalStorage::new(output_path);
    let pipeline = DashboardPipeline::new(storage, config);
    let engine = DashboardEngine::new(pipeline);

    assert!(engine.run().await.is_err());
}

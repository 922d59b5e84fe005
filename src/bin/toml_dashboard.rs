use clap::Parser;
use engagement_etl::config::toml_config::TomlConfig;
use engagement_etl::core::ConfigProvider;
use engagement_etl::utils::{logger, validation::Validate};
use engagement_etl::{DashboardEngine, DashboardPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-dashboard")]
#[command(about = "Dashboard data pipeline driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be computed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() && !args.verbose {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-driven dashboard pipeline");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = DashboardPipeline::new(storage, config);

    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard pipeline completed successfully!");
            println!("✅ Dashboard pipeline completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard pipeline failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                engagement_etl::utils::error::ErrorSeverity::Low => 0,
                engagement_etl::utils::error::ErrorSeverity::Medium => 2,
                engagement_etl::utils::error::ErrorSeverity::High => 1,
                engagement_etl::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Source: {}", config.source.path);
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    println!("  KPIs: {}", config.kpi_specs().len());
    println!("  Charts: {}", config.chart_specs().len());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📥 Data Source:");
    println!("  CSV file: {}", config.source.path);

    println!();
    println!("🔎 Filters:");
    let spec = config.filter_spec();
    match &spec.gender {
        engagement_etl::GenderFilter::Any => println!("  Gender: all"),
        engagement_etl::GenderFilter::Exact(g) => println!("  Gender: {}", g),
    }
    println!("  Age: {}..={}", spec.age_min, spec.age_max);
    match &spec.platforms {
        engagement_etl::PlatformFilter::Any => println!("  Platforms: all"),
        engagement_etl::PlatformFilter::Only(set) => {
            let list: Vec<&str> = set.iter().map(String::as_str).collect();
            println!("  Platforms: {}", list.join(", "));
        }
    }

    println!();
    println!("📊 Computations:");
    for kpi in config.kpi_specs() {
        println!("  KPI '{}': {:?} of '{}'", kpi.label, kpi.reducer, kpi.field);
    }
    for chart in config.chart_specs() {
        println!(
            "  Chart '{}' ({:?} scope): {:?} grouped by '{}'",
            chart.name, chart.scope, chart.aggregation.reducer, chart.aggregation.group_key
        );
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

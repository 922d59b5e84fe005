pub mod cli;
pub mod toml_config;

use crate::domain::model::{
    AggregationSpec, ChartSpec, FilterSpec, GenderFilter, KpiSpec, PlatformFilter, Reducer, Scope,
    ValueSource,
};

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

/// The KPI widgets of the original dashboard, computed over the filtered rows.
pub fn default_kpi_specs() -> Vec<KpiSpec> {
    vec![
        KpiSpec {
            label: "Total Time Spent (hours)".to_string(),
            field: "Total Time Spent".to_string(),
            reducer: Reducer::Sum,
        },
        KpiSpec {
            label: "Average Productivity Loss".to_string(),
            field: "ProductivityLoss".to_string(),
            reducer: Reducer::Mean,
        },
        KpiSpec {
            label: "Average Addiction Level".to_string(),
            field: "Addiction Level".to_string(),
            reducer: Reducer::Mean,
        },
    ]
}

/// The chart sections of the original dashboard. "Engagement by Platform"
/// deliberately aggregates the unfiltered table, every other chart the
/// filtered one; each declares its scope so nothing is implicit.
pub fn default_chart_specs() -> Vec<ChartSpec> {
    fn chart(name: &str, scope: Scope, group_key: &str, value: ValueSource, reducer: Reducer) -> ChartSpec {
        ChartSpec {
            name: name.to_string(),
            scope,
            aggregation: AggregationSpec {
                group_key: group_key.to_string(),
                value,
                reducer,
            },
        }
    }
    fn field(name: &str) -> ValueSource {
        ValueSource::Field(name.to_string())
    }

    vec![
        chart(
            "User Demographics",
            Scope::Filtered,
            "Gender",
            field("Gender"),
            Reducer::Count,
        ),
        chart(
            "Engagement by Platform",
            Scope::Global,
            "Platform",
            field("Engagement"),
            Reducer::Sum,
        ),
        chart(
            "Average Time Spent on Videos by Category",
            Scope::Filtered,
            "Video Category",
            field("Time Spent On Video"),
            Reducer::Mean,
        ),
        chart(
            "Average Satisfaction by Profession",
            Scope::Filtered,
            "Profession",
            field("Satisfaction"),
            Reducer::Mean,
        ),
        chart(
            "Debt to Income Ratio by Platform",
            Scope::Filtered,
            "Platform",
            ValueSource::Ratio {
                numerator: "Debt".to_string(),
                denominator: "Income".to_string(),
            },
            Reducer::Mean,
        ),
        chart(
            "Watch Time by Device Type",
            Scope::Filtered,
            "DeviceType",
            field("Total Time Spent"),
            Reducer::Sum,
        ),
        chart(
            "Scroll Rate by Video Length",
            Scope::Filtered,
            "Video Length",
            field("Scroll Rate"),
            Reducer::Mean,
        ),
        chart(
            "Average Engagement by Platform",
            Scope::Filtered,
            "Platform",
            field("Engagement"),
            Reducer::Mean,
        ),
        chart(
            "Sessions Distribution",
            Scope::Filtered,
            "Number of Sessions",
            field("Number of Sessions"),
            Reducer::Count,
        ),
    ]
}

/// Build a [`FilterSpec`] from optional boundary inputs: an omitted gender or
/// platform list means "include all", matching the original sidebar's "All"
/// options without a magic string.
pub fn build_filter_spec(
    gender: Option<&str>,
    age_min: i64,
    age_max: i64,
    platforms: &[String],
) -> FilterSpec {
    FilterSpec {
        gender: match gender {
            Some(g) => GenderFilter::Exact(g.to_string()),
            None => GenderFilter::Any,
        },
        age_min,
        age_max,
        platforms: if platforms.is_empty() {
            PlatformFilter::Any
        } else {
            PlatformFilter::Only(platforms.iter().cloned().collect())
        },
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "engagement-etl")]
#[command(about = "Compute dashboard KPIs and chart aggregates from an engagement CSV")]
pub struct CliConfig {
    /// Source CSV file
    #[arg(long, default_value = "Time-Wasters on Social Media.csv")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Keep only rows with this gender (omit for all)
    #[arg(long)]
    pub gender: Option<String>,

    /// Inclusive lower age bound
    #[arg(long, default_value = "0")]
    pub age_min: i64,

    /// Inclusive upper age bound
    #[arg(long, default_value = "100")]
    pub age_max: i64,

    /// Comma-separated platform whitelist (omit for all)
    #[arg(long, value_delimiter = ',')]
    pub platforms: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory usage per stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn filter_spec(&self) -> FilterSpec {
        build_filter_spec(
            self.gender.as_deref(),
            self.age_min,
            self.age_max,
            &self.platforms,
        )
    }

    fn kpi_specs(&self) -> Vec<KpiSpec> {
        default_kpi_specs()
    }

    fn chart_specs(&self) -> Vec<ChartSpec> {
        default_chart_specs()
    }

    fn output_formats(&self) -> Vec<String> {
        vec![
            "kpis".to_string(),
            "charts".to_string(),
            "filtered".to_string(),
        ]
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_range("age_min", self.age_min, 0, 100)?;
        validation::validate_range("age_max", self.age_max, 0, 100)?;
        if let Some(gender) = &self.gender {
            validation::validate_non_empty_string("gender", gender)?;
        }
        for platform in &self.platforms {
            validation::validate_non_empty_string("platforms", platform)?;
        }
        Ok(())
    }
}

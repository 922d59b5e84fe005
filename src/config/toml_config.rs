use crate::config::{build_filter_spec, default_chart_specs, default_kpi_specs};
use crate::core::ConfigProvider;
use crate::domain::model::{ChartSpec, FilterSpec, KpiSpec};
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub filters: Option<FiltersConfig>,
    #[serde(default, rename = "kpi")]
    pub kpis: Vec<KpiSpec>,
    #[serde(default, rename = "chart")]
    pub charts: Vec<ChartSpec>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
}

/// Sidebar selections. Omitted gender/platforms mean "include all".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub gender: Option<String>,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    pub platforms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// Load a dashboard configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse a dashboard configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PipelineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute `${VAR_NAME}` placeholders from the environment.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("source.path", &self.source.path)?;
        validation::validate_file_extension("source.path", &self.source.path, &["csv"])?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(filters) = &self.filters {
            if let Some(age_min) = filters.age_min {
                validation::validate_range("filters.age_min", age_min, 0, 100)?;
            }
            if let Some(age_max) = filters.age_max {
                validation::validate_range("filters.age_max", age_max, 0, 100)?;
            }
        }

        for chart in &self.charts {
            validation::validate_non_empty_string("chart.name", &chart.name)?;
            validation::validate_non_empty_string("chart.group_key", &chart.aggregation.group_key)?;
        }

        let valid_formats = ["kpis", "charts", "filtered"];
        for format in &self.load.output_formats {
            if !valid_formats.contains(&format.as_str()) {
                return Err(PipelineError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source_path(&self) -> &str {
        &self.source.path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn filter_spec(&self) -> FilterSpec {
        match &self.filters {
            Some(f) => build_filter_spec(
                f.gender.as_deref(),
                f.age_min.unwrap_or(0),
                f.age_max.unwrap_or(100),
                f.platforms.as_deref().unwrap_or(&[]),
            ),
            None => FilterSpec::all(),
        }
    }

    fn kpi_specs(&self) -> Vec<KpiSpec> {
        if self.kpis.is_empty() {
            default_kpi_specs()
        } else {
            self.kpis.clone()
        }
    }

    fn chart_specs(&self) -> Vec<ChartSpec> {
        if self.charts.is_empty() {
            default_chart_specs()
        } else {
            self.charts.clone()
        }
    }

    fn output_formats(&self) -> Vec<String> {
        self.load.output_formats.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

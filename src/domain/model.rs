use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A single cell of the source table. CSV cells are type-guessed on load:
/// integer first, then float, otherwise string; empty cells become `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl FieldValue {
    /// Interpret the value as `f64` for sum/mean reduction and ratio metrics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Guess the type of a raw CSV cell.
    pub fn from_csv_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return FieldValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return FieldValue::Float(f);
        }
        FieldValue::Str(trimmed.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Str(s) => write!(f, "{s}"),
            FieldValue::Null => write!(f, ""),
        }
    }
}

/// One row of the source table. No field is guaranteed non-null and no
/// field carries a uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }
}

/// Gender selection. The original dashboards mixed a magic `"All"` string
/// into the option list; here the sentinel is a real alternative so it can
/// never collide with a category value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenderFilter {
    Any,
    Exact(String),
}

/// Platform selection. `Only` with an empty set selects nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlatformFilter {
    Any,
    Only(BTreeSet<String>),
}

/// User-selected inclusion criteria, rebuilt by the host on every run.
///
/// `age_min > age_max` is a legal spec that matches no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub gender: GenderFilter,
    pub age_min: i64,
    pub age_max: i64,
    pub platforms: PlatformFilter,
}

impl FilterSpec {
    /// The identity filter: every record passes.
    pub fn all() -> Self {
        Self {
            gender: GenderFilter::Any,
            age_min: 0,
            age_max: 100,
            platforms: PlatformFilter::Any,
        }
    }
}

/// Order-independent fold over one partition of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Sum,
    Mean,
    Count,
}

/// Where the reduced value comes from: a plain column, or a per-record
/// ratio of two numeric columns with a zero-divisor guard
/// (`num / if den == 0 { 1 } else { den }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Field(String),
    Ratio { numerator: String, denominator: String },
}

/// Group-by key, value source and reducer for one summary computation.
/// `Count` ignores the value source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub group_key: String,
    pub value: ValueSource,
    pub reducer: Reducer,
}

/// One `(group key, reduced value)` pair of an aggregate result. Rows come
/// out in first-appearance order of the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub value: f64,
}

/// A scalar KPI widget: one reducer over one column of the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSpec {
    pub label: String,
    pub field: String,
    pub reducer: Reducer,
}

/// Which snapshot a chart aggregates over. The original variants silently
/// mixed both; every chart now declares its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Filtered,
    Global,
}

/// One chart section of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub name: String,
    pub scope: Scope,
    #[serde(flatten)]
    pub aggregation: AggregationSpec,
}

/// A computed KPI. `value` is `None` when a mean was requested over an
/// empty filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiValue {
    pub label: String,
    pub value: Option<f64>,
}

/// A computed chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub name: String,
    pub scope: Scope,
    pub rows: Vec<AggregateRow>,
}

/// Everything the transform stage hands to the load stage. The presentation
/// layer consumes this bundle; the pipeline renders nothing itself.
#[derive(Debug, Clone)]
pub struct DashboardBundle {
    pub kpis: Vec<KpiValue>,
    pub charts: Vec<ChartData>,
    pub filtered_csv: String,
    pub total_rows: usize,
    pub filtered_rows: usize,
}

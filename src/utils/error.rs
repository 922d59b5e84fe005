use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Column '{column}' is missing from the dataset")]
    MissingColumn { column: String },

    #[error("Non-numeric value in column '{field}': '{sample}'")]
    NonNumericValue { field: String, sample: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    DataQuality,
    Io,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::ConfigError { .. }
            | PipelineError::MissingConfigError { .. }
            | PipelineError::InvalidConfigValueError { .. }
            | PipelineError::ConfigValidationError { .. }
            | PipelineError::MissingColumn { .. } => ErrorCategory::Configuration,
            PipelineError::NonNumericValue { .. } | PipelineError::CsvError(_) => {
                ErrorCategory::DataQuality
            }
            PipelineError::IoError(_) | PipelineError::ZipError(_) => ErrorCategory::Io,
            PipelineError::SerializationError(_)
            | PipelineError::ProcessingError { .. }
            | PipelineError::ValidationError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::DataQuality => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Processing => ErrorSeverity::Medium,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PipelineError::MissingColumn { column } => {
                format!("The dataset has no '{}' column; check the chart and KPI configuration against the CSV header", column)
            }
            PipelineError::NonNumericValue { field, sample } => {
                format!("Column '{}' contains a non-numeric value ('{}') but a sum/mean was requested over it", field, sample)
            }
            PipelineError::CsvError(e) => format!("The source file could not be parsed as CSV: {}", e),
            PipelineError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => {
                "Fix the configuration (column names, filter bounds, paths) and re-run".to_string()
            }
            ErrorCategory::DataQuality => {
                "Clean the offending column in the source CSV, or aggregate a different column"
                    .to_string()
            }
            ErrorCategory::Io => {
                "Check that the input file exists and the output directory is writable".to_string()
            }
            ErrorCategory::Processing => "Re-run with --verbose to see the failing stage".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

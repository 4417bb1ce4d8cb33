//! Error and warning types for the analysis pipeline.
//!
//! Fatal conditions are [`ReportError`] values returned through [`Result`].
//! Per-column anomalies never abort a run; they are collected as
//! [`AnalysisWarning`] values on the finished report.
//!
//! Errors are serializable so they can be shipped to a frontend as
//! `{ "code": ..., "message": ... }`.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The dataset has no rows or no columns.
    #[error("Dataset is empty ({rows} rows, {columns} columns)")]
    EmptyDataset { rows: usize, columns: usize },

    /// A column's length differs from the first column's length.
    #[error("Column '{column}' has {actual} cells, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Two columns share a name.
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// The input file has an extension the loader does not read.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet reading error.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDataset { .. } => "EMPTY_DATASET",
            Self::ColumnLengthMismatch { .. } => "COLUMN_LENGTH_MISMATCH",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is the empty-dataset precondition failure.
    pub fn is_empty_dataset(&self) -> bool {
        match self {
            Self::EmptyDataset { .. } => true,
            Self::WithContext { source, .. } => source.is_empty_dataset(),
            _ => false,
        }
    }
}

/// Serialize as a struct with `code` and `message` fields.
impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ReportError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ReportError::Polars(e).with_context(context))
    }
}

/// Which statistic degenerated for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateStatistic {
    /// Fewer than two values, so the sample standard deviation is undefined.
    InsufficientValues,
    /// Every value is identical.
    ZeroVariance,
    /// Mean is zero, so the coefficient of variation is undefined.
    UndefinedCoefficientOfVariation,
    /// Q1 equals Q3; outlier fences collapse to a single value.
    ZeroInterquartileRange,
}

impl DegenerateStatistic {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::InsufficientValues => "insufficient values",
            Self::ZeroVariance => "zero variance",
            Self::UndefinedCoefficientOfVariation => "undefined coefficient of variation",
            Self::ZeroInterquartileRange => "zero interquartile range",
        }
    }
}

/// Non-fatal anomalies collected while analyzing a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// A column could not be classified and was left out of
    /// numeric/categorical analysis.
    UnresolvedType { column: String, reason: String },
    /// A statistic was undefined for a column and is reported as null.
    DegenerateStatistic {
        column: String,
        statistic: DegenerateStatistic,
    },
}

impl AnalysisWarning {
    /// Column the warning refers to.
    pub fn column(&self) -> &str {
        match self {
            Self::UnresolvedType { column, .. } | Self::DegenerateStatistic { column, .. } => {
                column
            }
        }
    }

    /// Get warning code for frontend handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnresolvedType { .. } => "UNRESOLVED_TYPE",
            Self::DegenerateStatistic { .. } => "DEGENERATE_STATISTIC",
        }
    }
}

impl std::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedType { column, reason } => {
                write!(f, "Column '{}' could not be classified: {}", column, reason)
            }
            Self::DegenerateStatistic { column, statistic } => {
                write!(f, "Column '{}' has {}", column, statistic.display_name())
            }
        }
    }
}

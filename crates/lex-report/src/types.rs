//! Core data model and analysis artifacts.
//!
//! A [`Dataset`] is an ordered set of equally long [`Column`]s whose cells are
//! [`CellValue`]s. Every stage of the pipeline reads the dataset and returns a
//! new, immutable artifact defined here.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisWarning, ReportError, Result};
use crate::insights::Insight;
use crate::reporting::ReportDocument;
use crate::utils::{format_date, parse_numeric_string};

// ============================================================================
// Cells
// ============================================================================

/// A single dataset cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    Null,
}

impl CellValue {
    /// Build a numeric cell. Non-finite values become [`CellValue::Null`].
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Null
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric reading of the cell: numbers as-is, text through the lenient
    /// numeric parser (currency symbols, `%`, thousands separators).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => parse_numeric_string(s),
            Self::Date(_) | Self::Null => None,
        }
    }

    /// Text used when the cell is shown or counted as a category.
    pub fn display_text(&self) -> Option<String> {
        match self {
            Self::Number(v) => Some(v.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Date(d) => Some(format_date(d)),
            Self::Null => None,
        }
    }

    /// Hashable identity of the cell for uniqueness and duplicate checks.
    pub fn key(&self) -> CellKey<'_> {
        match self {
            // -0.0 and 0.0 compare equal, so they must hash equal
            Self::Number(v) if *v == 0.0 => CellKey::Number(0.0f64.to_bits()),
            Self::Number(v) => CellKey::Number(v.to_bits()),
            Self::Text(s) => CellKey::Text(s),
            Self::Date(d) => CellKey::Date(*d),
            Self::Null => CellKey::Null,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Type-aware identity of a cell. A number never equals a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Number(u64),
    Text(&'a str),
    Date(NaiveDateTime),
    Null,
}

// ============================================================================
// Columns and datasets
// ============================================================================

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Categorical,
    Datetime,
    Identifier,
    Unknown,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Datetime => "datetime",
            Self::Identifier => "identifier",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
    /// Loader-supplied type, used only when the column has no non-null cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<SemanticType>,
}

impl Column {
    pub fn new<I, V>(name: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            name: name.into(),
            cells: cells.into_iter().map(Into::into).collect(),
            type_hint: None,
        }
    }

    pub fn with_type_hint(mut self, hint: SemanticType) -> Self {
        self.type_hint = Some(hint);
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().filter(|c| !c.is_null())
    }
}

/// An immutable, validated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, checking that every column has the same length and
    /// that column names are unique.
    ///
    /// Non-finite numbers are stored as [`CellValue::Null`].
    pub fn new(mut columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);

        for cell in columns.iter_mut().flat_map(|c| c.cells.iter_mut()) {
            if matches!(*cell, CellValue::Number(v) if !v.is_finite()) {
                *cell = CellValue::Null;
            }
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != row_count {
                return Err(ReportError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ReportError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn n_rows(&self) -> usize {
        self.row_count
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Zero rows or zero columns.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    /// Cells of row `index` in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(move |c| &c.cells[index])
    }

    /// New dataset where text cells matching a configured missing marker
    /// are replaced by [`CellValue::Null`].
    pub fn normalized(&self, config: &AnalysisConfig) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                cells: column
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        CellValue::Text(s) if config.is_missing_marker(s) => CellValue::Null,
                        other => other.clone(),
                    })
                    .collect(),
                type_hint: column.type_hint,
            })
            .collect();

        Dataset {
            columns,
            row_count: self.row_count,
        }
    }

    /// New dataset holding only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|column| Column {
                name: column.name.clone(),
                cells: indices.iter().map(|&i| column.cells[i].clone()).collect(),
                type_hint: column.type_hint,
            })
            .collect();

        Dataset {
            columns,
            row_count: indices.len(),
        }
    }
}

// ============================================================================
// Analysis artifacts
// ============================================================================

/// Semantic type of a column together with the counts that decided it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub column: String,
    pub semantic_type: SemanticType,
    pub non_null_count: usize,
    pub unique_count: usize,
    /// Non-null cells readable as numbers.
    pub numeric_count: usize,
    /// Non-null cells readable as dates.
    pub date_count: usize,
    /// The type came from the loader hint rather than the values.
    pub from_hint: bool,
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub column: String,
    pub count: usize,
    /// Non-null cells that did not parse as numbers.
    pub invalid_count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub iqr: Option<f64>,
    pub cv: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub outlier_count: usize,
}

/// IQR-fence outliers of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub column: String,
    pub count: usize,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub outlier_count: usize,
    /// First few outlying values in row order.
    pub examples: Vec<f64>,
}

impl OutlierSummary {
    /// Share of the column's numeric values that are outliers.
    pub fn outlier_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.outlier_count as f64 / self.count as f64
        }
    }
}

/// One row of a categorical frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
    /// Share of non-null values, 0-100.
    pub percentage: f64,
}

/// Frequency profile of one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalProfile {
    pub column: String,
    pub unique_count: usize,
    pub non_null_count: usize,
    pub top_values: Vec<FrequencyEntry>,
    /// Share of non-null values covered by `top_values`, 0-1.
    pub coverage: Option<f64>,
    /// unique / non-null, 0-1.
    pub cardinality_ratio: Option<f64>,
}

/// Missingness of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub column: String,
    pub missing_count: usize,
    /// Share of rows missing, 0-1.
    pub missing_rate: f64,
}

/// Dataset-wide quality metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub total_cells: usize,
    pub total_missing: usize,
    /// 1 - missing / total cells.
    pub completeness: f64,
    pub duplicate_rows: usize,
    pub unique_rows: usize,
    pub columns: Vec<ColumnQuality>,
    /// Columns whose type could not be resolved.
    pub unresolved_columns: Vec<String>,
}

/// Pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where the coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Every defined off-diagonal pair `(a, b, r)` with `a` before `b`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.columns.iter().enumerate().flat_map(move |(i, a)| {
            self.columns
                .iter()
                .enumerate()
                .skip(i + 1)
                .filter_map(move |(j, b)| self.values[i][j].map(|r| (a.as_str(), b.as_str(), r)))
        })
    }
}

/// Recorded when the analyzed rows are a sample of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingInfo {
    pub original_rows: usize,
    pub sampled_rows: usize,
    pub seed: u64,
}

/// Every intermediate artifact of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisArtifacts {
    pub classifications: Vec<ColumnClassification>,
    pub quality: QualityReport,
    pub numeric_stats: Vec<NumericStats>,
    pub outliers: Vec<OutlierSummary>,
    pub categorical_profiles: Vec<CategoricalProfile>,
    pub correlation: CorrelationMatrix,
}

impl AnalysisArtifacts {
    /// Number of columns classified as `semantic_type`.
    pub fn count_of_type(&self, semantic_type: SemanticType) -> usize {
        self.classifications
            .iter()
            .filter(|c| c.semantic_type == semantic_type)
            .count()
    }

    pub fn classification(&self, column: &str) -> Option<&ColumnClassification> {
        self.classifications.iter().find(|c| c.column == column)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    CompletedWithWarnings,
}

/// Result of [`Pipeline::analyze`](crate::Pipeline::analyze).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub document: ReportDocument,
    pub artifacts: AnalysisArtifacts,
    pub insights: Vec<Insight>,
    pub warnings: Vec<AnalysisWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingInfo>,
    /// Kept outside `document` so the document is identical across runs.
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl AnalysisReport {
    pub fn status(&self) -> ReportStatus {
        if self.warnings.is_empty() {
            ReportStatus::Completed
        } else {
            ReportStatus::CompletedWithWarnings
        }
    }
}

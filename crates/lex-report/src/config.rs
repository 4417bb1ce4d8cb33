//! Configuration types for the analysis pipeline.
//!
//! Every threshold used by classification, profiling and insight rules lives
//! here so that none of them is a hidden constant. Use the builder for
//! ergonomic setup, or deserialize from JSON.

use serde::{Deserialize, Serialize};

/// Text values treated as missing, compared case-insensitively after trimming.
pub const DEFAULT_MISSING_MARKERS: [&str; 7] = ["", "na", "n/a", "null", "none", "nan", "#n/a"];

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_report::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .top_k(5)
///     .correlation_threshold(0.8)
///     .sampling_threshold(100_000)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of most frequent values kept per categorical column.
    /// Default: 10
    pub top_k: usize,

    /// Multiplier applied to the IQR when computing outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Absolute Pearson coefficient above which a pair is reported.
    /// Default: 0.7
    pub correlation_threshold: f64,

    /// Maximum number of insights kept after ranking.
    /// Default: 15
    pub max_insights: usize,

    /// Row count above which a uniform sample is analyzed instead.
    /// Default: None (never sample)
    pub sampling_threshold: Option<usize>,

    /// Seed for the sampling RNG.
    /// Default: 42
    pub sampling_seed: u64,

    /// Share of non-null values that must parse as numbers (or dates)
    /// for a column to be classified numeric (or datetime).
    /// Default: 0.9
    pub numeric_ratio: f64,

    /// Absolute unique-value ceiling for categorical columns.
    /// Default: 20
    pub categorical_max_unique: usize,

    /// Unique-value ceiling for categorical columns as a share of row count.
    /// The effective ceiling is the larger of the two.
    /// Default: 0.05
    pub categorical_unique_fraction: f64,

    /// Unique/non-null ratio at or above which a high-cardinality column
    /// is classified as an identifier rather than unknown.
    /// Default: 0.95
    pub identifier_ratio: f64,

    /// Completeness below which a quality warning is raised.
    /// Default: 0.95
    pub completeness_threshold: f64,

    /// Share of outlying values above which an outlier warning is raised.
    /// Default: 0.05
    pub outlier_rate_threshold: f64,

    /// Share of a single category above which the column is flagged as
    /// carrying little information.
    /// Default: 0.9
    pub dominant_category_threshold: f64,

    /// Cardinality ratio at or above which a categorical column is flagged
    /// as a near-identifier.
    /// Default: 0.9
    pub near_identifier_ratio: f64,

    /// Per-column missing rate above which a column is flagged as sparse.
    /// Default: 0.2
    pub sparse_column_threshold: f64,

    /// Coefficient of variation above which a column is flagged as highly
    /// variable.
    /// Default: 1.0
    pub high_cv_threshold: f64,

    /// Text values normalized to null before analysis.
    /// Default: [`DEFAULT_MISSING_MARKERS`]
    pub missing_markers: Vec<String>,

    /// Report title.
    /// Default: "Data Analysis Report"
    pub report_title: String,

    /// Report author.
    /// Default: "Data Analyst"
    pub author: String,

    /// Maximum number of per-column charts in a section.
    /// Default: 4
    pub max_charts_per_section: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            iqr_multiplier: 1.5,
            correlation_threshold: 0.7,
            max_insights: 15,
            sampling_threshold: None,
            sampling_seed: 42,
            numeric_ratio: 0.9,
            categorical_max_unique: 20,
            categorical_unique_fraction: 0.05,
            identifier_ratio: 0.95,
            completeness_threshold: 0.95,
            outlier_rate_threshold: 0.05,
            dominant_category_threshold: 0.9,
            near_identifier_ratio: 0.9,
            sparse_column_threshold: 0.2,
            high_cv_threshold: 1.0,
            missing_markers: DEFAULT_MISSING_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            report_title: "Data Analysis Report".to_string(),
            author: "Data Analyst".to_string(),
            max_charts_per_section: 4,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let ratios = [
            ("correlation_threshold", self.correlation_threshold),
            ("numeric_ratio", self.numeric_ratio),
            ("categorical_unique_fraction", self.categorical_unique_fraction),
            ("identifier_ratio", self.identifier_ratio),
            ("completeness_threshold", self.completeness_threshold),
            ("outlier_rate_threshold", self.outlier_rate_threshold),
            ("dominant_category_threshold", self.dominant_category_threshold),
            ("near_identifier_ratio", self.near_identifier_ratio),
            ("sparse_column_threshold", self.sparse_column_threshold),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if !(self.high_cv_threshold.is_finite() && self.high_cv_threshold >= 0.0) {
            return Err(ConfigValidationError::InvalidMultiplier(self.high_cv_threshold));
        }

        if self.top_k == 0 {
            return Err(ConfigValidationError::ZeroCount("top_k".to_string()));
        }

        if self.max_insights == 0 {
            return Err(ConfigValidationError::ZeroCount("max_insights".to_string()));
        }

        if self.sampling_threshold == Some(0) {
            return Err(ConfigValidationError::ZeroCount(
                "sampling_threshold".to_string(),
            ));
        }

        Ok(())
    }

    /// Check whether a trimmed text value is one of the configured
    /// missing-value markers.
    pub fn is_missing_marker(&self, value: &str) -> bool {
        let trimmed = value.trim();
        self.missing_markers
            .iter()
            .any(|marker| marker.trim().eq_ignore_ascii_case(trimmed))
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid multiplier: {0} (must be a positive finite number)")]
    InvalidMultiplier(f64),

    #[error("Invalid value for '{0}': must be at least 1")]
    ZeroCount(String),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    base: Option<AnalysisConfig>,
    top_k: Option<usize>,
    iqr_multiplier: Option<f64>,
    correlation_threshold: Option<f64>,
    max_insights: Option<usize>,
    sampling_threshold: Option<usize>,
    sampling_seed: Option<u64>,
    numeric_ratio: Option<f64>,
    categorical_max_unique: Option<usize>,
    near_identifier_ratio: Option<f64>,
    missing_markers: Option<Vec<String>>,
    report_title: Option<String>,
    author: Option<String>,
    max_charts_per_section: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Start from an existing configuration (e.g. one loaded from JSON);
    /// values set on the builder override it.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self {
            base: Some(config),
            ..Self::default()
        }
    }

    /// Set how many categories are kept per categorical column.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set the IQR multiplier for outlier fences.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the absolute correlation that triggers a correlation insight.
    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = Some(threshold);
        self
    }

    /// Set the maximum number of insights in the report.
    pub fn max_insights(mut self, max: usize) -> Self {
        self.max_insights = Some(max);
        self
    }

    /// Analyze a uniform sample of `rows` rows when the dataset is larger.
    pub fn sampling_threshold(mut self, rows: usize) -> Self {
        self.sampling_threshold = Some(rows);
        self
    }

    /// Set the sampling seed.
    pub fn sampling_seed(mut self, seed: u64) -> Self {
        self.sampling_seed = Some(seed);
        self
    }

    /// Set the share of parseable values required for numeric/datetime types.
    pub fn numeric_ratio(mut self, ratio: f64) -> Self {
        self.numeric_ratio = Some(ratio);
        self
    }

    /// Set the absolute unique-value ceiling for categorical columns.
    pub fn categorical_max_unique(mut self, max: usize) -> Self {
        self.categorical_max_unique = Some(max);
        self
    }

    /// Set the cardinality ratio that flags near-identifier columns.
    pub fn near_identifier_ratio(mut self, ratio: f64) -> Self {
        self.near_identifier_ratio = Some(ratio);
        self
    }

    /// Replace the list of missing-value markers.
    pub fn missing_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_markers = Some(markers.into_iter().map(Into::into).collect());
        self
    }

    /// Set the report title.
    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = Some(title.into());
        self
    }

    /// Set the report author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the maximum number of per-column charts in a section.
    pub fn max_charts_per_section(mut self, max: usize) -> Self {
        self.max_charts_per_section = Some(max);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let base = self.base.unwrap_or_default();
        let config = AnalysisConfig {
            top_k: self.top_k.unwrap_or(base.top_k),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(base.iqr_multiplier),
            correlation_threshold: self
                .correlation_threshold
                .unwrap_or(base.correlation_threshold),
            max_insights: self.max_insights.unwrap_or(base.max_insights),
            sampling_threshold: self.sampling_threshold.or(base.sampling_threshold),
            sampling_seed: self.sampling_seed.unwrap_or(base.sampling_seed),
            numeric_ratio: self.numeric_ratio.unwrap_or(base.numeric_ratio),
            categorical_max_unique: self
                .categorical_max_unique
                .unwrap_or(base.categorical_max_unique),
            near_identifier_ratio: self
                .near_identifier_ratio
                .unwrap_or(base.near_identifier_ratio),
            missing_markers: self.missing_markers.unwrap_or(base.missing_markers),
            report_title: self.report_title.unwrap_or(base.report_title),
            author: self.author.unwrap_or(base.author),
            max_charts_per_section: self
                .max_charts_per_section
                .unwrap_or(base.max_charts_per_section),
            ..base
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_k, 10);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.correlation_threshold, 0.7);
        assert_eq!(config.max_insights, 15);
        assert_eq!(config.sampling_threshold, None);
        assert_eq!(config.sampling_seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .top_k(3)
            .iqr_multiplier(3.0)
            .correlation_threshold(0.5)
            .max_insights(4)
            .sampling_threshold(1000)
            .sampling_seed(7)
            .report_title("Sales")
            .author("Ops")
            .build()
            .unwrap();

        assert_eq!(config.top_k, 3);
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.correlation_threshold, 0.5);
        assert_eq!(config.max_insights, 4);
        assert_eq!(config.sampling_threshold, Some(1000));
        assert_eq!(config.sampling_seed, 7);
        assert_eq!(config.report_title, "Sales");
        assert_eq!(config.author, "Ops");
    }

    #[test]
    fn test_builder_from_config_keeps_base_values() {
        let base = AnalysisConfig {
            top_k: 4,
            dominant_category_threshold: 0.8,
            ..AnalysisConfig::default()
        };
        let config = AnalysisConfigBuilder::from_config(base)
            .max_insights(2)
            .build()
            .unwrap();

        assert_eq!(config.top_k, 4);
        assert_eq!(config.dominant_category_threshold, 0.8);
        assert_eq!(config.max_insights, 2);
    }

    #[test]
    fn test_validation_invalid_threshold() {
        let result = AnalysisConfig::builder().correlation_threshold(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_multiplier() {
        let result = AnalysisConfig::builder().iqr_multiplier(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidMultiplier(_)
        ));
    }

    #[test]
    fn test_validation_zero_counts() {
        assert!(matches!(
            AnalysisConfig::builder().top_k(0).build().unwrap_err(),
            ConfigValidationError::ZeroCount(_)
        ));
        assert!(matches!(
            AnalysisConfig::builder().max_insights(0).build().unwrap_err(),
            ConfigValidationError::ZeroCount(_)
        ));
        assert!(matches!(
            AnalysisConfig::builder().sampling_threshold(0).build().unwrap_err(),
            ConfigValidationError::ZeroCount(_)
        ));
    }

    #[test]
    fn test_missing_markers() {
        let config = AnalysisConfig::default();
        assert!(config.is_missing_marker(""));
        assert!(config.is_missing_marker("  N/A "));
        assert!(config.is_missing_marker("NULL"));
        assert!(!config.is_missing_marker("0"));
        assert!(!config.is_missing_marker("unknown"));

        let strict = AnalysisConfig::builder()
            .missing_markers([""])
            .build()
            .unwrap();
        assert!(!strict.is_missing_marker("NA"));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "top_k": 5,
            "correlation_threshold": 0.8,
            "sampling_threshold": 5000,
            "report_title": "Quarterly Review"
        }"#;

        let config: AnalysisConfig =
            serde_json::from_str(json).expect("Should deserialize partial JSON");

        assert_eq!(config.top_k, 5);
        assert_eq!(config.correlation_threshold, 0.8);
        assert_eq!(config.sampling_threshold, Some(5000));
        assert_eq!(config.report_title, "Quarterly Review");
        // Unspecified fields keep their defaults
        assert_eq!(config.max_insights, 15);
        assert_eq!(config.iqr_multiplier, 1.5);
    }
}

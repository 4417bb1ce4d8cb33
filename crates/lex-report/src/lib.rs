//! Automated Dataset Analysis and Report Library
//!
//! Takes a tabular dataset and produces a structured, render-agnostic
//! analysis report: column classification, data-quality audit, descriptive
//! statistics, outlier detection, categorical frequency profiles,
//! correlations and ranked natural-language insights.
//!
//! # Overview
//!
//! - **Classification**: Each column is typed as numeric, categorical,
//!   datetime, identifier or unknown
//! - **Quality Audit**: Missing values per column, completeness, duplicate rows
//! - **Statistics**: Mean, median, std, quartiles, IQR fences, coefficient of variation
//! - **Profiles**: Top-k value frequencies for categorical columns
//! - **Correlations**: Pairwise-complete Pearson matrix over numeric columns
//! - **Insights**: A fixed table of rules turned into ranked, deduplicated sentences
//! - **Report**: Ordered sections of narrative, tables and chart specifications
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_report::{AnalysisConfig, Pipeline, ingest};
//!
//! let dataset = ingest::load_dataset("sales.csv")?;
//!
//! let config = AnalysisConfig::builder()
//!     .top_k(5)
//!     .correlation_threshold(0.8)
//!     .report_title("Quarterly Sales")
//!     .build()?;
//!
//! let report = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .analyze(&dataset)?;
//!
//! for insight in &report.insights {
//!     println!("[{}] {}", insight.severity.label(), insight.text);
//! }
//! ```
//!
//! # Building datasets in memory
//!
//! ```rust,ignore
//! use lex_report::{CellValue, Column, Dataset};
//!
//! let dataset = Dataset::new(vec![
//!     Column::new("score", [10.0, 20.0, 30.0, 40.0, 1000.0]),
//!     Column::new("grade", [Some("A"), Some("B"), None, Some("A"), Some("C")]),
//! ])?;
//! ```
//!
//! A dataset with zero rows or zero columns is rejected with
//! [`ReportError::EmptyDataset`]. Everything else completes; columns that
//! cannot be analyzed become [`AnalysisWarning`]s on the report.

pub mod config;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{AnalysisWarning, DegenerateStatistic, ReportError, Result, ResultExt};
pub use insights::{
    Insight, InsightCategory, InsightEngine, InsightRule, RuleBasedInsightEngine, Severity,
};
pub use pipeline::{
    AnalysisStage, ClosureProgressReporter, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate,
};
pub use profiler::{
    CategoricalProfiler, CorrelationAnalyzer, DataProfiler, DescriptiveStatsEngine,
    OutlierDetector, TypeClassifier,
};
pub use quality::QualityAuditor;
pub use reporting::{
    Block, ChartKind, ChartSpec, DataRef, ReportAssembler, ReportDocument, ReportGenerator,
    Section, Table,
};
pub use types::{
    AnalysisArtifacts, AnalysisReport, CategoricalProfile, CellValue, Column,
    ColumnClassification, ColumnQuality, CorrelationMatrix, Dataset, FrequencyEntry,
    NumericStats, OutlierSummary, QualityReport, ReportStatus, SamplingInfo, SemanticType,
};

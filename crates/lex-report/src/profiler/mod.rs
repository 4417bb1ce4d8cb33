//! Column profiling for dataset analysis.
//!
//! This module provides:
//! - Semantic type classification ([`TypeClassifier`])
//! - Descriptive statistics ([`DescriptiveStatsEngine`])
//! - IQR outlier detection ([`OutlierDetector`])
//! - Categorical frequency profiles ([`CategoricalProfiler`])
//! - Pairwise correlations ([`CorrelationAnalyzer`])
//!
//! [`DataProfiler`] drives them over a whole dataset. Statistics, outliers,
//! categorical profiles and correlations share nothing but the input and run
//! concurrently on the rayon pool; results are collected in column order.

mod categorical;
mod correlation;
mod outliers;
mod statistics;
mod type_inference;

pub use categorical::CategoricalProfiler;
pub use correlation::CorrelationAnalyzer;
pub use outliers::{MAX_OUTLIER_EXAMPLES, OutlierDetector};
pub use statistics::DescriptiveStatsEngine;
pub use type_inference::TypeClassifier;

use rayon::prelude::*;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::AnalysisWarning;
use crate::types::{
    CategoricalProfile, Column, ColumnClassification, CorrelationMatrix, Dataset, NumericStats,
    OutlierSummary, SemanticType,
};

/// Output of the per-column analysis stage.
#[derive(Debug, Clone)]
pub struct ColumnAnalysis {
    pub numeric_stats: Vec<NumericStats>,
    pub outliers: Vec<OutlierSummary>,
    pub categorical_profiles: Vec<CategoricalProfile>,
    pub correlation: CorrelationMatrix,
    pub warnings: Vec<AnalysisWarning>,
}

/// Data profiler driving the column-level components.
pub struct DataProfiler;

impl DataProfiler {
    /// Classify every column of the dataset, in column order.
    pub fn classify_dataset(
        dataset: &Dataset,
        config: &AnalysisConfig,
    ) -> (Vec<ColumnClassification>, Vec<AnalysisWarning>) {
        let results: Vec<_> = dataset
            .columns()
            .par_iter()
            .map(|column| TypeClassifier::classify(column, config))
            .collect();

        let mut classifications = Vec::with_capacity(results.len());
        let mut warnings = Vec::new();
        for (classification, warning) in results {
            debug!(
                column = %classification.column,
                semantic_type = %classification.semantic_type,
                unique = classification.unique_count,
                "Classified column"
            );
            classifications.push(classification);
            warnings.extend(warning);
        }

        (classifications, warnings)
    }

    /// Run statistics, outlier detection, categorical profiling and
    /// correlation analysis over the classified columns.
    pub fn analyze_columns(
        dataset: &Dataset,
        classifications: &[ColumnClassification],
        config: &AnalysisConfig,
    ) -> ColumnAnalysis {
        let numeric = columns_of_type(dataset, classifications, SemanticType::Numeric);
        let categorical = columns_of_type(dataset, classifications, SemanticType::Categorical);

        let ((described, detected), (categorical_profiles, correlation)) = rayon::join(
            || {
                rayon::join(
                    || {
                        numeric
                            .par_iter()
                            .map(|column| DescriptiveStatsEngine::describe(column))
                            .collect::<Vec<_>>()
                    },
                    || {
                        numeric
                            .par_iter()
                            .map(|column| OutlierDetector::detect(column, config.iqr_multiplier))
                            .collect::<Vec<_>>()
                    },
                )
            },
            || {
                rayon::join(
                    || {
                        categorical
                            .par_iter()
                            .map(|column| CategoricalProfiler::profile(column, config.top_k))
                            .collect::<Vec<_>>()
                    },
                    || CorrelationAnalyzer::analyze(&numeric),
                )
            },
        );

        let mut warnings = Vec::new();
        let mut numeric_stats = Vec::with_capacity(described.len());
        let mut outliers = Vec::with_capacity(detected.len());

        for ((mut stats, stat_warnings), (summary, outlier_warning)) in
            described.into_iter().zip(detected)
        {
            stats.lower_bound = summary.lower_bound;
            stats.upper_bound = summary.upper_bound;
            stats.outlier_count = summary.outlier_count;

            warnings.extend(stat_warnings);
            warnings.extend(outlier_warning);
            numeric_stats.push(stats);
            outliers.push(summary);
        }

        debug!(
            numeric = numeric_stats.len(),
            categorical = categorical_profiles.len(),
            pairs = correlation.pairs().count(),
            "Column analysis finished"
        );

        ColumnAnalysis {
            numeric_stats,
            outliers,
            categorical_profiles,
            correlation,
            warnings,
        }
    }
}

fn columns_of_type<'a>(
    dataset: &'a Dataset,
    classifications: &[ColumnClassification],
    semantic_type: SemanticType,
) -> Vec<&'a Column> {
    dataset
        .columns()
        .iter()
        .zip(classifications)
        .filter(|(_, c)| c.semantic_type == semantic_type)
        .map(|(column, _)| column)
        .collect()
}
